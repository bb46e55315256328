// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Track messages: `{ "event": ..., "properties": { ... } }`.

use serde_json::{Map, Value};

use super::{candidate_with_token, stamp_default_time, SkipLog};
use crate::config::MixpanelConfig;
use crate::parse::{generic, special};
use crate::result::{Message, MessageBuildError, MessageBuildResult, SkippedProperty};
use crate::special::{MessageKind, SpecialProperty};
use crate::value::{ObjectProperty, RawValue};

/// Builds a track message.
///
/// Only `token` and `event` are required. Any other property that fails to
/// parse is dropped and the message still succeeds.
pub fn build<I>(
	token: Option<&str>,
	event: Option<&str>,
	super_properties: &[ObjectProperty],
	raw_properties: I,
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
) -> MessageBuildResult
where
	I: IntoIterator<Item = ObjectProperty>,
{
	build_inner(
		token,
		event,
		super_properties,
		raw_properties,
		distinct_id,
		config,
		SkipLog::silent(),
	)
}

/// Like [`build`], also reporting every dropped property into `skipped`.
pub fn build_with_diagnostics<I>(
	token: Option<&str>,
	event: Option<&str>,
	super_properties: &[ObjectProperty],
	raw_properties: I,
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
	skipped: &mut Vec<SkippedProperty>,
) -> MessageBuildResult
where
	I: IntoIterator<Item = ObjectProperty>,
{
	build_inner(
		token,
		event,
		super_properties,
		raw_properties,
		distinct_id,
		config,
		SkipLog::collecting(skipped),
	)
}

fn build_inner<I>(
	token: Option<&str>,
	event: Option<&str>,
	super_properties: &[ObjectProperty],
	raw_properties: I,
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
	mut skip: SkipLog<'_>,
) -> MessageBuildResult
where
	I: IntoIterator<Item = ObjectProperty>,
{
	let resolved = candidate_with_token(
		MessageKind::Track,
		token,
		super_properties,
		raw_properties,
		distinct_id,
		config,
	)?;

	let event = event
		.filter(|e| !e.trim().is_empty())
		.ok_or_else(|| MessageBuildError::new("'event' is not set."))?;

	let mut properties = Map::new();
	properties.insert(
		SpecialProperty::Token.key(MessageKind::Track).to_string(),
		resolved.token,
	);

	let mut specials = Vec::new();
	for (property, raw) in resolved.candidate.special_properties() {
		if property == SpecialProperty::Token {
			continue;
		}
		match special::parse(property, raw.value()) {
			Ok(value) => specials.push((property, value)),
			Err(e) => skip.skip(raw.raw_name(), &e),
		}
	}
	if config.default_time {
		stamp_default_time(&mut specials);
	}
	for (property, value) in specials {
		properties.insert(property.key(MessageKind::Track).to_string(), value);
	}

	for raw in resolved.candidate.user_properties() {
		match generic::parse(raw.value(), true) {
			Ok(value) => {
				properties.insert(raw.raw_name().to_string(), value);
			}
			Err(e) => skip.skip(raw.raw_name(), &e),
		}
	}

	let mut message = Map::new();
	message.insert(
		SpecialProperty::Event.key(MessageKind::Track).to_string(),
		Value::String(event.to_string()),
	);
	message.insert("properties".to_string(), Value::Object(properties));
	Ok(Message::new(message))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::IpAddressHandling;
	use chrono::{TimeZone, Utc};
	use proptest::prelude::*;
	use serde_json::json;

	const TOKEN: &str = "e3bc4100330c35722740fb8c6f5abddc";

	fn keys(message: &Message) -> Vec<String> {
		message.properties().unwrap().keys().cloned().collect()
	}

	#[test]
	fn documented_example() {
		let raw = vec![ObjectProperty::new("Referred By", "Friend")];
		let message = build(
			Some(TOKEN),
			Some("Signed Up"),
			&[],
			raw,
			Some(RawValue::from("13793")),
			&MixpanelConfig::default(),
		)
		.unwrap();

		assert_eq!(
			message.into_value(),
			json!({
				"event": "Signed Up",
				"properties": {
					"token": TOKEN,
					"distinct_id": "13793",
					"Referred By": "Friend",
				}
			})
		);
	}

	#[test]
	fn minimal_message_has_exact_keys() {
		let message = build(
			Some(TOKEN),
			Some("Opened"),
			&[],
			Vec::new(),
			None,
			&MixpanelConfig::default(),
		)
		.unwrap();

		let top: Vec<_> = message.as_map().keys().cloned().collect();
		assert_eq!(top, vec!["event", "properties"]);
		assert_eq!(keys(&message), vec!["token"]);
	}

	#[test]
	fn missing_token_fails() {
		for token in [None, Some(""), Some("   ")] {
			let err = build(token, Some("Opened"), &[], Vec::new(), None, &MixpanelConfig::default())
				.unwrap_err();
			assert!(err.error().contains("token"), "{err}");
		}
	}

	#[test]
	fn missing_event_fails() {
		for event in [None, Some(""), Some("\t")] {
			let err = build(Some(TOKEN), event, &[], Vec::new(), None, &MixpanelConfig::default())
				.unwrap_err();
			assert!(err.error().contains("event"), "{err}");
		}
	}

	#[test]
	fn token_can_come_from_super_properties() {
		let supers = vec![ObjectProperty::new("token", TOKEN)];
		let message = build(None, Some("Opened"), &supers, Vec::new(), None, &MixpanelConfig::default())
			.unwrap();
		assert_eq!(message.properties().unwrap()["token"], TOKEN);
	}

	#[test]
	fn raw_properties_beat_super_properties() {
		let supers = vec![
			ObjectProperty::new("plan", "free"),
			ObjectProperty::new("source", "web"),
		];
		let raw = vec![ObjectProperty::new("plan", "pro")];
		let message = build(Some(TOKEN), Some("Upgraded"), &supers, raw, None, &MixpanelConfig::default())
			.unwrap();

		let props = message.properties().unwrap();
		assert_eq!(props["plan"], "pro");
		assert_eq!(props["source"], "web");
		assert_eq!(keys(&message), vec!["token", "plan", "source"]);
	}

	#[test]
	fn special_properties_come_first_in_canonical_order() {
		let time = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
		let raw = vec![
			ObjectProperty::new("color", "blue"),
			ObjectProperty::new("$insert_id", "abc-123"),
			ObjectProperty::new("ip", "10.0.0.1"),
			ObjectProperty::new("time", time),
			ObjectProperty::new("distinct_id", 42),
		];
		let message = build(Some(TOKEN), Some("Viewed"), &[], raw, None, &MixpanelConfig::default())
			.unwrap();

		assert_eq!(
			keys(&message),
			vec!["token", "distinct_id", "time", "ip", "$insert_id", "color"]
		);
		let props = message.properties().unwrap();
		assert_eq!(props["distinct_id"], "42");
		assert_eq!(props["time"], time.timestamp());
	}

	#[test]
	fn unparseable_user_property_is_dropped() {
		let raw = vec![
			ObjectProperty::new("handle", RawValue::opaque::<std::fs::File>()),
			ObjectProperty::new("kept", 1),
		];
		let mut skipped = Vec::new();
		let message = build_with_diagnostics(
			Some(TOKEN),
			Some("Opened"),
			&[],
			raw,
			None,
			&MixpanelConfig::default(),
			&mut skipped,
		)
		.unwrap();

		assert_eq!(keys(&message), vec!["token", "kept"]);
		assert_eq!(skipped.len(), 1);
		assert_eq!(skipped[0].name, "handle");
		assert!(skipped[0].reason.contains("std::fs::File"));
	}

	#[test]
	fn bad_optional_special_property_is_dropped() {
		let raw = vec![
			ObjectProperty::new("time", "yesterday"),
			ObjectProperty::new("distinct_id", ""),
		];
		let message = build(Some(TOKEN), Some("Opened"), &[], raw, None, &MixpanelConfig::default())
			.unwrap();
		assert_eq!(keys(&message), vec!["token"]);
	}

	#[test]
	fn ignored_request_ip_omits_ip() {
		let config = MixpanelConfig {
			ip_address_handling: IpAddressHandling::IgnoreRequestIp,
			..Default::default()
		};
		let raw = vec![ObjectProperty::new("ip", "10.0.0.1")];
		let message = build(Some(TOKEN), Some("Opened"), &[], raw, None, &config).unwrap();
		assert_eq!(keys(&message), vec!["token"]);
	}

	#[test]
	fn default_time_is_stamped_in_canonical_position() {
		let config = MixpanelConfig {
			default_time: true,
			..Default::default()
		};
		let raw = vec![
			ObjectProperty::new("ip", "10.0.0.1"),
			ObjectProperty::new("x", 1),
		];
		let message = build(Some(TOKEN), Some("Opened"), &[], raw, Some(RawValue::from("u1")), &config)
			.unwrap();

		assert_eq!(keys(&message), vec!["token", "distinct_id", "time", "ip", "x"]);
		assert!(message.properties().unwrap()["time"].is_i64());
	}

	#[test]
	fn supplied_time_beats_default_time() {
		let config = MixpanelConfig {
			default_time: true,
			..Default::default()
		};
		let raw = vec![ObjectProperty::new("time", 1_000i64)];
		let message = build(Some(TOKEN), Some("Opened"), &[], raw, None, &config).unwrap();
		assert_eq!(message.properties().unwrap()["time"], 1_000);
	}

	#[test]
	fn nested_user_collections_are_kept() {
		let raw = vec![ObjectProperty::new(
			"items",
			RawValue::Seq(vec![RawValue::from("a"), RawValue::Map(vec![("n".into(), RawValue::from(1))])]),
		)];
		let message = build(Some(TOKEN), Some("Bought"), &[], raw, None, &MixpanelConfig::default())
			.unwrap();
		assert_eq!(message.properties().unwrap()["items"], json!(["a", {"n": 1}]));
	}

	proptest! {
		#[test]
		fn building_twice_is_structurally_equal(
			names in proptest::collection::vec("[a-z]{1,6}", 0..12),
			distinct_id in "[a-z0-9]{1,12}",
		) {
			let raw: Vec<_> = names.iter().enumerate().map(|(i, n)| ObjectProperty::new(n.clone(), i)).collect();
			let first = build(Some(TOKEN), Some("E"), &[], raw.clone(), Some(RawValue::from(distinct_id.clone())), &MixpanelConfig::default()).unwrap();
			let second = build(Some(TOKEN), Some("E"), &[], raw, Some(RawValue::from(distinct_id)), &MixpanelConfig::default()).unwrap();
			prop_assert_eq!(keys(&first), keys(&second));
			prop_assert_eq!(first, second);
		}

		#[test]
		fn blank_tokens_always_fail(token in "[ \t\n]{0,5}") {
			let result = build(Some(token.as_str()), Some("E"), &[], Vec::new(), None, &MixpanelConfig::default());
			prop_assert!(result.unwrap_err().error().contains("token"));
		}
	}
}
