// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parser for arbitrary user property values.

use std::fmt::Write;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Number, Value};

use crate::result::{ValueParseError, ValueParseResult};
use crate::value::RawValue;

/// Normalizes a caller value into a JSON-safe value.
///
/// Scalars keep their semantic value, date-times become Unix seconds, UUIDs
/// and durations become their canonical strings. Sequences and mappings are
/// parsed element-wise when `allow_collections` is set; the first failing
/// element fails the whole value.
pub fn parse(value: &RawValue, allow_collections: bool) -> ValueParseResult {
	match value {
		RawValue::Null => Ok(Value::Null),
		RawValue::Bool(b) => Ok(Value::Bool(*b)),
		RawValue::Char(c) => Ok(Value::String(c.to_string())),
		RawValue::Int(i) => Ok(Value::from(*i)),
		RawValue::UInt(u) => Ok(Value::from(*u)),
		RawValue::Float(f) => Number::from_f64(*f)
			.map(Value::Number)
			.ok_or_else(|| ValueParseError::new(format!("float {f} has no JSON representation"))),
		RawValue::String(s) => Ok(Value::String(s.clone())),
		RawValue::DateTime(_) | RawValue::NaiveDateTime(_) => to_utc(value)
			.map(|dt| Value::from(dt.timestamp()))
			.ok_or_else(|| ValueParseError::new("date-time could not be converted to UTC")),
		RawValue::Uuid(u) => Ok(Value::String(u.hyphenated().to_string())),
		RawValue::Duration(d) => Ok(Value::String(format_duration(*d))),
		RawValue::Seq(items) if allow_collections => items
			.iter()
			.enumerate()
			.map(|(index, item)| {
				parse(item, true).map_err(|e| {
					ValueParseError::new(format!("element {index}: {}", e.details()))
				})
			})
			.collect::<Result<Vec<_>, _>>()
			.map(Value::Array),
		RawValue::Map(entries) if allow_collections => {
			let mut map = Map::new();
			for (key, item) in entries {
				let parsed = parse(item, true).map_err(|e| {
					ValueParseError::new(format!("entry '{key}': {}", e.details()))
				})?;
				map.insert(key.clone(), parsed);
			}
			Ok(Value::Object(map))
		}
		RawValue::Seq(_) | RawValue::Map(_) => Err(ValueParseError::new(format!(
			"{} is not allowed here, only scalar values are accepted",
			value.shape()
		))),
		RawValue::Opaque { type_name } => Err(ValueParseError::new(format!(
			"value of type '{type_name}' cannot be represented as JSON"
		))),
	}
}

/// Converts a date-time value to UTC. Naive date-times are taken as UTC.
pub(crate) fn to_utc(value: &RawValue) -> Option<DateTime<Utc>> {
	match value {
		RawValue::DateTime(dt) => Some(dt.with_timezone(&Utc)),
		RawValue::NaiveDateTime(dt) => Some(dt.and_utc()),
		_ => None,
	}
}

/// Formats a duration as `[-][d.]hh:mm:ss[.fffffff]`.
pub(crate) fn format_duration(delta: TimeDelta) -> String {
	let negative = delta < TimeDelta::zero();
	let delta = if negative { -delta } else { delta };

	let total_secs = delta.num_seconds();
	let ticks = delta.subsec_nanos() / 100;
	let days = total_secs / 86_400;
	let hours = (total_secs % 86_400) / 3_600;
	let minutes = (total_secs % 3_600) / 60;
	let secs = total_secs % 60;

	let mut out = String::new();
	if negative {
		out.push('-');
	}
	if days > 0 {
		let _ = write!(out, "{days}.");
	}
	let _ = write!(out, "{hours:02}:{minutes:02}:{secs:02}");
	if ticks > 0 {
		let _ = write!(out, ".{ticks:07}");
	}
	out
}
