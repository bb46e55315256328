// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end tests for the client facade.

use std::collections::HashMap;
use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use mixpanel::config::{load_from_sources, ENV_DATA_RESIDENCY, ENV_TOKEN};
use mixpanel::{
	DataResidency, DefaultsSource, EnvSource, IpAddressHandling, MessageKind, MixpanelClient,
	MixpanelConfig, MixpanelError, Properties, RawValue, TomlSource,
};
use serde::Serialize;
use serde_json::json;

const TOKEN: &str = "e3bc4100330c35722740fb8c6f5abddc";

fn client_with(config: MixpanelConfig) -> MixpanelClient {
	MixpanelClient::with_config(Some(TOKEN.to_string()), config)
}

#[test]
fn track_signed_up_example() {
	let client = MixpanelClient::new(TOKEN);
	let encoded = client
		.track(
			"Signed Up",
			Some(RawValue::from("13793")),
			Properties::new().insert("Referred By", "Friend"),
		)
		.unwrap();

	assert_eq!(encoded.kind, MessageKind::Track);
	assert_eq!(encoded.endpoint, "https://api.mixpanel.com/track");
	assert_eq!(
		encoded.json,
		r#"{"event":"Signed Up","properties":{"token":"e3bc4100330c35722740fb8c6f5abddc","distinct_id":"13793","Referred By":"Friend"}}"#
	);
	let decoded = STANDARD.decode(&encoded.base64).unwrap();
	assert_eq!(decoded, encoded.json.as_bytes());
}

#[test]
fn track_drops_unrepresentable_property() {
	struct Handle;

	let client = MixpanelClient::new(TOKEN);
	let (encoded, skipped) = client
		.track_with_diagnostics(
			"Opened",
			Some(RawValue::from(1)),
			Properties::new()
				.insert("handle", RawValue::opaque::<Handle>())
				.insert("kept", true),
		)
		.unwrap();

	let props = encoded.message.properties().unwrap();
	assert!(props.get("handle").is_none());
	assert_eq!(props["kept"], true);
	assert_eq!(skipped.len(), 1);
	assert_eq!(skipped[0].name, "handle");
}

#[test]
fn track_requires_token_and_event() {
	let client = MixpanelClient::with_config(None, MixpanelConfig::default());
	let err = client.track("Opened", None, Properties::new()).unwrap_err();
	match err {
		MixpanelError::Build(e) => assert!(e.error().contains("token")),
		other => panic!("unexpected error: {other:?}"),
	}

	let client = MixpanelClient::new(TOKEN);
	let err = client.track("  ", None, Properties::new()).unwrap_err();
	match err {
		MixpanelError::Build(e) => assert_eq!(e.error(), "'event' is not set."),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[test]
fn track_object_extracts_fields() {
	#[derive(Serialize)]
	struct Checkout {
		cart_size: u32,
		coupon: Option<String>,
	}

	let client = client_with(MixpanelConfig {
		property_name_format: mixpanel::PropertyNameFormat::TitleCase,
		..Default::default()
	});
	let encoded = client
		.track_object(
			"Checkout",
			Some(RawValue::from("u9")),
			&Checkout {
				cart_size: 3,
				coupon: None,
			},
		)
		.unwrap();

	let props = encoded.message.properties().unwrap();
	assert_eq!(props["Cart Size"], 3);
	assert_eq!(props["distinct_id"], "u9");
	assert!(props["Coupon"].is_null());
}

#[test]
fn track_object_keeps_special_field_names() {
	#[derive(Serialize)]
	struct Visit {
		distinct_id: &'static str,
		ip: &'static str,
		time: u64,
		plan: &'static str,
	}

	let client = client_with(MixpanelConfig {
		property_name_format: mixpanel::PropertyNameFormat::TitleCase,
		ip_address_handling: IpAddressHandling::IgnoreRequestIp,
		..Default::default()
	});
	let encoded = client
		.track_object(
			"Opened",
			None,
			&Visit {
				distinct_id: "u1",
				ip: "203.0.113.7",
				time: 1000,
				plan: "pro",
			},
		)
		.unwrap();

	assert_eq!(encoded.endpoint, "https://api.mixpanel.com/track?ip=0");
	assert_eq!(
		encoded.message.into_value(),
		json!({
			"event": "Opened",
			"properties": {
				"token": TOKEN,
				"distinct_id": "u1",
				"time": 1000,
				"Plan": "pro"
			}
		})
	);
}

#[test]
fn register_object_keeps_special_field_names() {
	#[derive(Serialize)]
	struct Context {
		distinct_id: &'static str,
		app_version: &'static str,
	}

	let mut client = client_with(MixpanelConfig {
		property_name_format: mixpanel::PropertyNameFormat::TitleCase,
		..Default::default()
	});
	client
		.register_object(&Context {
			distinct_id: "u7",
			app_version: "3.1",
		})
		.unwrap();

	let encoded = client.track("Opened", None, Properties::new()).unwrap();
	let props = encoded.message.properties().unwrap();
	assert_eq!(props["distinct_id"], "u7");
	assert_eq!(props["App Version"], "3.1");
}

#[test]
fn track_object_rejects_non_objects() {
	let client = MixpanelClient::new(TOKEN);
	let err = client
		.track_object("Opened", None, &vec![1, 2, 3])
		.unwrap_err();
	assert!(matches!(err, MixpanelError::Extraction(_)));
}

#[test]
fn ignore_request_ip_omits_ip_and_sets_query() {
	let client = client_with(MixpanelConfig {
		ip_address_handling: IpAddressHandling::IgnoreRequestIp,
		..Default::default()
	});
	let encoded = client
		.track(
			"Opened",
			Some(RawValue::from(1)),
			Properties::new().insert("ip", "203.0.113.7"),
		)
		.unwrap();

	assert_eq!(encoded.endpoint, "https://api.mixpanel.com/track?ip=0");
	assert!(encoded.message.properties().unwrap().get("ip").is_none());
}

#[test]
fn eu_residency_changes_host() {
	let client = client_with(MixpanelConfig {
		data_residency: DataResidency::Eu,
		..Default::default()
	});
	let encoded = client.people_delete(RawValue::from("u1")).unwrap();
	assert_eq!(encoded.endpoint, "https://api-eu.mixpanel.com/engage");
}

#[test]
fn default_time_stamps_track_and_people() {
	let client = client_with(MixpanelConfig {
		default_time: true,
		..Default::default()
	});
	let before = Utc::now().timestamp();

	let track = client
		.track("Opened", Some(RawValue::from(1)), Properties::new())
		.unwrap();
	let time = track.message.properties().unwrap()["time"].as_i64().unwrap();
	assert!(time >= before);

	let people = client
		.people_set(RawValue::from(1), Properties::new().insert("plan", "pro"))
		.unwrap();
	assert!(people.message.get("$time").unwrap().as_i64().unwrap() >= before);
}

#[test]
fn alias_builds_create_alias() {
	let client = MixpanelClient::new(TOKEN);
	let encoded = client
		.alias(RawValue::from("13793"), RawValue::from("bob@example.com"))
		.unwrap();

	assert_eq!(encoded.kind, MessageKind::Alias);
	assert_eq!(encoded.endpoint, "https://api.mixpanel.com/track");
	assert_eq!(
		encoded.message.into_value(),
		json!({
			"event": "$create_alias",
			"properties": {
				"token": TOKEN,
				"distinct_id": "13793",
				"alias": "bob@example.com"
			}
		})
	);
}

#[test]
fn people_operations_use_their_keys() {
	let client = MixpanelClient::new(TOKEN);
	let id = || RawValue::from("u1");

	let set_once = client
		.people_set_once(id(), Properties::new().insert("first_seen", "today"))
		.unwrap();
	assert_eq!(set_once.message.get("$set_once").unwrap(), &json!({"first_seen": "today"}));

	let add = client
		.people_add(
			id(),
			Properties::new().insert("logins", 1).insert("label", "x"),
		)
		.unwrap();
	assert_eq!(add.message.get("$add").unwrap(), &json!({"logins": 1}));

	let append = client
		.people_append(id(), Properties::new().insert("pages", "/home"))
		.unwrap();
	assert_eq!(append.message.get("$append").unwrap(), &json!({"pages": "/home"}));

	let union = client
		.people_union(
			id(),
			Properties::new()
				.insert("tags", vec!["a", "b"])
				.insert("scalar", 1),
		)
		.unwrap();
	assert_eq!(union.message.get("$union").unwrap(), &json!({"tags": ["a", "b"]}));

	let remove = client
		.people_remove(id(), Properties::new().insert("tags", "a"))
		.unwrap();
	assert_eq!(remove.message.get("$remove").unwrap(), &json!({"tags": "a"}));
}

#[test]
fn people_set_ignores_user_super_properties() {
	let mut client = MixpanelClient::new(TOKEN);
	client.register("app_version", "2.0");

	let encoded = client
		.people_set(RawValue::from("u1"), Properties::new().insert("$name", "Bob"))
		.unwrap();
	assert_eq!(
		encoded.message.into_value(),
		json!({
			"$token": TOKEN,
			"$distinct_id": "u1",
			"$set": { "$name": "Bob" }
		})
	);
}

#[test]
fn people_set_ignores_person_attribute_super_properties() {
	let mut client = MixpanelClient::new(TOKEN);
	client.register("name", "Checkout Service");
	client.register("email", "ops@example.com");

	let encoded = client
		.people_set(RawValue::from("u1"), Properties::new().insert("plan", "pro"))
		.unwrap();
	assert_eq!(
		encoded.message.into_value(),
		json!({
			"$token": TOKEN,
			"$distinct_id": "u1",
			"$set": { "plan": "pro" }
		})
	);

	let track = client
		.track("Opened", Some(RawValue::from("u1")), Properties::new())
		.unwrap();
	assert_eq!(track.message.properties().unwrap()["name"], "Checkout Service");
}

#[test]
fn people_unset_and_delete() {
	let client = MixpanelClient::new(TOKEN);

	let unset = client
		.people_unset(RawValue::from("u1"), &["plan", "trial"])
		.unwrap();
	assert_eq!(unset.message.get("$unset").unwrap(), &json!(["plan", "trial"]));

	let delete = client.people_delete(RawValue::from("u1")).unwrap();
	assert_eq!(delete.message.get("$delete").unwrap(), &json!(""));
}

#[test]
fn people_track_charge_appends_transaction() {
	let client = MixpanelClient::new(TOKEN);
	let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

	let encoded = client
		.people_track_charge(RawValue::from("u1"), 29.99, Some(RawValue::from(at)))
		.unwrap();
	assert_eq!(
		encoded.message.get("$append").unwrap(),
		&json!({
			"$transactions": {
				"$time": "2024-03-01T12:00:00Z",
				"$amount": 29.99
			}
		})
	);

	let err = client
		.people_track_charge(RawValue::from("u1"), "lots", None)
		.unwrap_err();
	assert!(matches!(err, MixpanelError::Build(_)));
}

#[test]
fn people_require_distinct_id() {
	let client = MixpanelClient::new(TOKEN);
	let err = client
		.people_set(RawValue::Null, Properties::new().insert("plan", "pro"))
		.unwrap_err();
	match err {
		MixpanelError::Build(e) => assert_eq!(e.error(), "'distinct_id' is not set."),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[test]
fn batch_encodes_array() {
	let client = MixpanelClient::new(TOKEN);
	let a = client
		.track("a", Some(RawValue::from(1)), Properties::new())
		.unwrap();
	let b = client
		.track("b", Some(RawValue::from(2)), Properties::new())
		.unwrap();

	let payload = client.encode_batch(&[a, b]).unwrap();
	let value: serde_json::Value = serde_json::from_str(&payload.json).unwrap();
	assert_eq!(value.as_array().unwrap().len(), 2);
	assert_eq!(value[1]["event"], "b");
}

#[test]
fn client_from_layered_config() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(file, "token = \"{TOKEN}\"").unwrap();
	writeln!(file, "data_residency = \"us\"").unwrap();
	writeln!(file, "ip_address_handling = \"use_request_ip\"").unwrap();

	let vars: HashMap<&str, &str> = [(ENV_DATA_RESIDENCY, "eu")].into_iter().collect();
	let env = EnvSource::with_lookup(move |name| vars.get(name).map(|v| v.to_string()));

	let loaded = load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(file.path())),
		Box::new(env),
	])
	.unwrap();
	assert_eq!(loaded.token.as_deref(), Some(TOKEN));

	let client = MixpanelClient::from_loaded(loaded);
	let encoded = client
		.track("Opened", Some(RawValue::from(1)), Properties::new())
		.unwrap();
	assert_eq!(encoded.endpoint, "https://api-eu.mixpanel.com/track?ip=1");
}

#[test]
fn env_token_is_optional() {
	let env = EnvSource::with_lookup(|name| (name == ENV_TOKEN).then(String::new));
	let loaded = load_from_sources(vec![Box::new(env)]).unwrap();
	assert!(loaded.token.is_none());
}
