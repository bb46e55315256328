// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! People (engage) messages.
//!
//! Every people message carries `$token` and `$distinct_id`, both required,
//! followed by the optional `$time`, `$ip`, `$ignore_time` and
//! `$ignore_alias`, and finally a single operation key:
//!
//! ```json
//! { "$token": "...", "$distinct_id": "...", "$set": { "$email": "...", "plan": "pro" } }
//! ```
//!
//! Super properties only contribute token, distinct id, time, ip and the
//! ignore flags here. User-level super properties and person attributes
//! such as `name` or `email` enrich events, not people profiles.

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use super::{candidate_with_token, required_identity, stamp_default_time, SkipLog};
use crate::candidate::MessageCandidate;
use crate::config::MixpanelConfig;
use crate::parse::{generic, special};
use crate::result::{
	Message, MessageBuildError, MessageBuildResult, SkippedProperty, ValueParseError,
	ValueParseResult,
};
use crate::special::{MessageKind, SpecialProperty, SpecialPropertyMapper};
use crate::value::{ObjectProperty, RawValue};

/// Operations that carry a mapping of person properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeopleOperation {
	Set,
	SetOnce,
	Add,
	Append,
	Union,
	Remove,
}

impl PeopleOperation {
	pub fn key(&self) -> &'static str {
		match self {
			PeopleOperation::Set => "$set",
			PeopleOperation::SetOnce => "$set_once",
			PeopleOperation::Add => "$add",
			PeopleOperation::Append => "$append",
			PeopleOperation::Union => "$union",
			PeopleOperation::Remove => "$remove",
		}
	}

	fn parse_value(&self, value: &RawValue) -> ValueParseResult {
		match self {
			PeopleOperation::Set | PeopleOperation::SetOnce | PeopleOperation::Append => {
				generic::parse(value, true)
			}
			PeopleOperation::Add => match generic::parse(value, false)? {
				number @ Value::Number(_) => Ok(number),
				_ => Err(ValueParseError::new(format!(
					"'$add' requires a number, got {}",
					value.shape()
				))),
			},
			PeopleOperation::Union => match value {
				RawValue::Seq(_) => generic::parse(value, true),
				_ => Err(ValueParseError::new(format!(
					"'$union' requires a sequence, got {}",
					value.shape()
				))),
			},
			PeopleOperation::Remove => generic::parse(value, false),
		}
	}
}

const UNSET_KEY: &str = "$unset";
const DELETE_KEY: &str = "$delete";
const TRANSACTIONS_KEY: &str = "$transactions";
const AMOUNT_KEY: &str = "$amount";
const TRANSACTION_TIME_KEY: &str = "$time";

/// Builds a people message for an operation carrying person properties.
pub fn build<I>(
	operation: PeopleOperation,
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	raw_properties: I,
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
) -> MessageBuildResult
where
	I: IntoIterator<Item = ObjectProperty>,
{
	build_inner(
		operation,
		token,
		super_properties,
		raw_properties,
		distinct_id,
		config,
		SkipLog::silent(),
	)
}

/// Like [`build`], also reporting every dropped property into `skipped`.
pub fn build_with_diagnostics<I>(
	operation: PeopleOperation,
	token: Option<&str>,
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
		operation,
		token,
		super_properties,
		raw_properties,
		distinct_id,
		config,
		SkipLog::collecting(skipped),
	)
}

fn build_inner<I>(
	operation: PeopleOperation,
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	raw_properties: I,
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
	mut skip: SkipLog<'_>,
) -> MessageBuildResult
where
	I: IntoIterator<Item = ObjectProperty>,
{
	let (mut message, candidate) = people_base(
		token,
		super_properties,
		raw_properties,
		distinct_id,
		config,
		&mut skip,
	)?;

	let mut payload = Map::new();
	for (property, raw) in candidate.special_properties() {
		if !property.is_person_attribute() {
			continue;
		}
		let parsed = special::parse(property, raw.value())
			.and_then(|_| operation.parse_value(raw.value()));
		match parsed {
			Ok(value) => {
				payload.insert(property.key(MessageKind::People).to_string(), value);
			}
			Err(e) => skip.skip(raw.raw_name(), &e),
		}
	}
	for raw in candidate.user_properties() {
		match operation.parse_value(raw.value()) {
			Ok(value) => {
				payload.insert(raw.raw_name().to_string(), value);
			}
			Err(e) => skip.skip(raw.raw_name(), &e),
		}
	}

	message.insert(operation.key().to_string(), Value::Object(payload));
	Ok(Message::new(message))
}

/// Builds a `$unset` message removing the named properties.
pub fn build_unset(
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	distinct_id: Option<RawValue>,
	property_names: &[&str],
	config: &MixpanelConfig,
) -> MessageBuildResult {
	let (mut message, _) = people_base(
		token,
		super_properties,
		std::iter::empty::<ObjectProperty>(),
		distinct_id,
		config,
		&mut SkipLog::silent(),
	)?;

	let names = property_names
		.iter()
		.filter(|name| !name.trim().is_empty())
		.map(|name| Value::String(name.to_string()))
		.collect();
	message.insert(UNSET_KEY.to_string(), Value::Array(names));
	Ok(Message::new(message))
}

/// Builds a `$delete` message removing the whole profile.
pub fn build_delete(
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
) -> MessageBuildResult {
	let (mut message, _) = people_base(
		token,
		super_properties,
		std::iter::empty::<ObjectProperty>(),
		distinct_id,
		config,
		&mut SkipLog::silent(),
	)?;

	message.insert(DELETE_KEY.to_string(), Value::String(String::new()));
	Ok(Message::new(message))
}

/// Builds a track-charge message: an `$append` of one `$transactions` entry.
///
/// `amount` must be numeric. `time` defaults to now; when supplied it must
/// be a valid time.
pub fn build_track_charge(
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	distinct_id: Option<RawValue>,
	amount: RawValue,
	time: Option<RawValue>,
	config: &MixpanelConfig,
) -> MessageBuildResult {
	let (mut message, _) = people_base(
		token,
		super_properties,
		std::iter::empty::<ObjectProperty>(),
		distinct_id,
		config,
		&mut SkipLog::silent(),
	)?;

	let amount = PeopleOperation::Add
		.parse_value(&amount)
		.map_err(|e| MessageBuildError::with_details("'amount' is not valid.", e.details()))?;

	let time = match time {
		Some(raw) => special::to_datetime(&raw).ok_or_else(|| {
			MessageBuildError::with_details(
				"'time' is not valid.",
				format!("expected a date-time or Unix time, got {}", raw.shape()),
			)
		})?,
		None => chrono::Utc::now(),
	};

	let mut transaction = Map::new();
	transaction.insert(
		TRANSACTION_TIME_KEY.to_string(),
		Value::String(time.to_rfc3339_opts(SecondsFormat::Secs, true)),
	);
	transaction.insert(AMOUNT_KEY.to_string(), amount);

	let mut append = Map::new();
	append.insert(TRANSACTIONS_KEY.to_string(), Value::Object(transaction));
	message.insert(
		PeopleOperation::Append.key().to_string(),
		Value::Object(append),
	);
	Ok(Message::new(message))
}

/// Validates the shared head of every people message and returns it along
/// with the candidate for the operation payload.
fn people_base<I>(
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	raw_properties: I,
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
	skip: &mut SkipLog<'_>,
) -> Result<(Map<String, Value>, MessageCandidate), MessageBuildError>
where
	I: IntoIterator<Item = ObjectProperty>,
{
	let mapper = SpecialPropertyMapper::for_kind(MessageKind::People);
	let super_specials: Vec<ObjectProperty> = super_properties
		.iter()
		.filter(|p| {
			mapper
				.resolve(p.raw_name())
				.is_some_and(|special| !special.is_person_attribute())
		})
		.cloned()
		.collect();

	let resolved = candidate_with_token(
		MessageKind::People,
		token,
		&super_specials,
		raw_properties,
		distinct_id,
		config,
	)?;
	let distinct_id = required_identity(&resolved.candidate, SpecialProperty::DistinctId)?;

	let mut specials = Vec::new();
	for (property, raw) in resolved.candidate.special_properties() {
		if matches!(property, SpecialProperty::Token | SpecialProperty::DistinctId)
			|| property.is_person_attribute()
		{
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

	let mut message = Map::new();
	message.insert(
		SpecialProperty::Token.key(MessageKind::People).to_string(),
		resolved.token,
	);
	message.insert(
		SpecialProperty::DistinctId.key(MessageKind::People).to_string(),
		distinct_id,
	);
	for (property, value) in specials {
		message.insert(property.key(MessageKind::People).to_string(), value);
	}

	Ok((message, resolved.candidate))
}
