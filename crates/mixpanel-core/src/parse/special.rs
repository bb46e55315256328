// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsers imposing protocol rules on special properties.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::parse::generic;
use crate::result::{ValueParseError, ValueParseResult};
use crate::special::SpecialProperty;
use crate::value::RawValue;

const MAX_INSERT_ID_LENGTH: usize = 36;

/// Parses `value` under the rules of `property`.
pub fn parse(property: SpecialProperty, value: &RawValue) -> ValueParseResult {
	match property {
		SpecialProperty::Token => token(value),
		SpecialProperty::Event => event(value),
		SpecialProperty::DistinctId => identity(value, "distinct_id"),
		SpecialProperty::Alias => identity(value, "alias"),
		SpecialProperty::InsertId => insert_id(value),
		SpecialProperty::Time => time(value),
		SpecialProperty::IpAddress => ip_address(value),
		SpecialProperty::IgnoreTime | SpecialProperty::IgnoreAlias => boolean(value),
		SpecialProperty::FirstName
		| SpecialProperty::LastName
		| SpecialProperty::Name
		| SpecialProperty::Email
		| SpecialProperty::Phone => generic::parse(value, false),
	}
}

pub fn token(value: &RawValue) -> ValueParseResult {
	non_blank_string(value, "token")
}

pub fn event(value: &RawValue) -> ValueParseResult {
	non_blank_string(value, "event")
}

/// Distinct ids and alias targets: any string or number with a non-empty
/// string form.
pub fn identity(value: &RawValue, name: &str) -> ValueParseResult {
	match stable_string(value) {
		Some(s) if s.trim().is_empty() => Err(ValueParseError::new(format!(
			"'{name}' cannot be empty"
		))),
		Some(s) => Ok(Value::String(s)),
		None => Err(ValueParseError::new(format!(
			"'{name}' must be a string or a number, got {}",
			value.shape()
		))),
	}
}

pub fn insert_id(value: &RawValue) -> ValueParseResult {
	let parsed = identity(value, "$insert_id")?;
	let len = parsed.as_str().map_or(0, |s| s.chars().count());
	if len > MAX_INSERT_ID_LENGTH {
		return Err(ValueParseError::new(format!(
			"'$insert_id' is {len} characters long, at most {MAX_INSERT_ID_LENGTH} are allowed"
		)));
	}
	Ok(parsed)
}

/// Date-times become Unix seconds; non-negative integers are taken as Unix
/// seconds already.
pub fn time(value: &RawValue) -> ValueParseResult {
	match value {
		RawValue::Int(i) if *i >= 0 => Ok(Value::from(*i)),
		RawValue::UInt(u) => Ok(Value::from(*u)),
		_ => to_datetime(value)
			.map(|dt| Value::from(dt.timestamp()))
			.ok_or_else(|| {
				ValueParseError::new(format!(
					"'time' must be a date-time or Unix time, got {}",
					value.shape()
				))
			}),
	}
}

pub fn ip_address(value: &RawValue) -> ValueParseResult {
	non_blank_string(value, "ip")
}

pub fn boolean(value: &RawValue) -> ValueParseResult {
	match value {
		RawValue::Bool(b) => Ok(Value::Bool(*b)),
		_ => Err(ValueParseError::new(format!(
			"expected a bool, got {}",
			value.shape()
		))),
	}
}

/// Resolves a time-like value to a UTC date-time.
pub(crate) fn to_datetime(value: &RawValue) -> Option<DateTime<Utc>> {
	match value {
		RawValue::Int(i) if *i >= 0 => DateTime::from_timestamp(*i, 0),
		RawValue::UInt(u) => i64::try_from(*u)
			.ok()
			.and_then(|secs| DateTime::from_timestamp(secs, 0)),
		_ => generic::to_utc(value),
	}
}

fn non_blank_string(value: &RawValue, name: &str) -> ValueParseResult {
	match value {
		RawValue::String(s) if !s.trim().is_empty() => Ok(Value::String(s.clone())),
		RawValue::String(_) => Err(ValueParseError::new(format!("'{name}' cannot be empty"))),
		_ => Err(ValueParseError::new(format!(
			"'{name}' must be a string, got {}",
			value.shape()
		))),
	}
}

fn stable_string(value: &RawValue) -> Option<String> {
	match value {
		RawValue::String(s) => Some(s.clone()),
		RawValue::Char(c) => Some(c.to_string()),
		RawValue::Int(i) => Some(i.to_string()),
		RawValue::UInt(u) => Some(u.to_string()),
		RawValue::Float(f) if f.is_finite() => Some(f.to_string()),
		RawValue::Uuid(u) => Some(u.hyphenated().to_string()),
		_ => None,
	}
}
