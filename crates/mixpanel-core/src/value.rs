// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loosely-typed property values as supplied by callers.
//!
//! [`RawValue`] is the input side of the pipeline: anything a caller can hand
//! us before validation. Parsers turn it into a JSON-safe
//! [`serde_json::Value`] or reject it.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, TimeZone};
use uuid::Uuid;

/// A caller-supplied property value that has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
	Null,
	Bool(bool),
	Char(char),
	Int(i64),
	UInt(u64),
	Float(f64),
	String(String),
	/// A date-time with a known offset.
	DateTime(DateTime<FixedOffset>),
	/// A date-time without a time zone. Treated as UTC.
	NaiveDateTime(NaiveDateTime),
	Uuid(Uuid),
	Duration(TimeDelta),
	Seq(Vec<RawValue>),
	/// Nested key/value mapping in insertion order.
	Map(Vec<(String, RawValue)>),
	/// A value with no JSON representation (handles, closures, resources).
	Opaque { type_name: String },
}

impl RawValue {
	/// Creates an opaque value standing in for an instance of `T`.
	pub fn opaque<T: ?Sized>() -> Self {
		RawValue::Opaque {
			type_name: std::any::type_name::<T>().to_string(),
		}
	}

	/// Names the shape of this value for error details.
	pub fn shape(&self) -> &str {
		match self {
			RawValue::Null => "null",
			RawValue::Bool(_) => "bool",
			RawValue::Char(_) => "char",
			RawValue::Int(_) => "integer",
			RawValue::UInt(_) => "unsigned integer",
			RawValue::Float(_) => "float",
			RawValue::String(_) => "string",
			RawValue::DateTime(_) => "date-time",
			RawValue::NaiveDateTime(_) => "naive date-time",
			RawValue::Uuid(_) => "uuid",
			RawValue::Duration(_) => "duration",
			RawValue::Seq(_) => "sequence",
			RawValue::Map(_) => "mapping",
			RawValue::Opaque { type_name } => type_name,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, RawValue::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			RawValue::String(s) => Some(s),
			_ => None,
		}
	}
}

macro_rules! impl_from_signed {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for RawValue {
				fn from(value: $ty) -> Self {
					RawValue::Int(value as i64)
				}
			}
		)*
	};
}

macro_rules! impl_from_unsigned {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for RawValue {
				fn from(value: $ty) -> Self {
					RawValue::UInt(value as u64)
				}
			}
		)*
	};
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for RawValue {
	fn from(value: f32) -> Self {
		RawValue::Float(f64::from(value))
	}
}

impl From<f64> for RawValue {
	fn from(value: f64) -> Self {
		RawValue::Float(value)
	}
}

impl From<bool> for RawValue {
	fn from(value: bool) -> Self {
		RawValue::Bool(value)
	}
}

impl From<char> for RawValue {
	fn from(value: char) -> Self {
		RawValue::Char(value)
	}
}

impl From<&str> for RawValue {
	fn from(value: &str) -> Self {
		RawValue::String(value.to_string())
	}
}

impl From<String> for RawValue {
	fn from(value: String) -> Self {
		RawValue::String(value)
	}
}

impl From<&String> for RawValue {
	fn from(value: &String) -> Self {
		RawValue::String(value.clone())
	}
}

impl<Tz: TimeZone> From<DateTime<Tz>> for RawValue {
	fn from(value: DateTime<Tz>) -> Self {
		RawValue::DateTime(value.fixed_offset())
	}
}

impl From<NaiveDateTime> for RawValue {
	fn from(value: NaiveDateTime) -> Self {
		RawValue::NaiveDateTime(value)
	}
}

impl From<Uuid> for RawValue {
	fn from(value: Uuid) -> Self {
		RawValue::Uuid(value)
	}
}

impl From<TimeDelta> for RawValue {
	fn from(value: TimeDelta) -> Self {
		RawValue::Duration(value)
	}
}

impl From<std::time::Duration> for RawValue {
	fn from(value: std::time::Duration) -> Self {
		match TimeDelta::from_std(value) {
			Ok(delta) => RawValue::Duration(delta),
			Err(_) => RawValue::opaque::<std::time::Duration>(),
		}
	}
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(RawValue::Null, Into::into)
	}
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
	fn from(value: Vec<T>) -> Self {
		RawValue::Seq(value.into_iter().map(Into::into).collect())
	}
}

impl From<serde_json::Value> for RawValue {
	fn from(value: serde_json::Value) -> Self {
		use serde_json::Value;

		match value {
			Value::Null => RawValue::Null,
			Value::Bool(b) => RawValue::Bool(b),
			Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					RawValue::Int(i)
				} else if let Some(u) = n.as_u64() {
					RawValue::UInt(u)
				} else {
					RawValue::Float(n.as_f64().unwrap_or(f64::NAN))
				}
			}
			Value::String(s) => RawValue::String(s),
			Value::Array(items) => RawValue::Seq(items.into_iter().map(RawValue::from).collect()),
			Value::Object(map) => {
				RawValue::Map(map.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect())
			}
		}
	}
}

/// One named property extracted from any input source.
///
/// The name is kept exactly as the source supplied it; classification into
/// special and user properties happens later, in the message candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
	raw_name: String,
	value: RawValue,
}

impl ObjectProperty {
	pub fn new(raw_name: impl Into<String>, value: impl Into<RawValue>) -> Self {
		Self {
			raw_name: raw_name.into(),
			value: value.into(),
		}
	}

	pub fn raw_name(&self) -> &str {
		&self.raw_name
	}

	pub fn value(&self) -> &RawValue {
		&self.value
	}

	pub fn into_parts(self) -> (String, RawValue) {
		(self.raw_name, self.value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{NaiveDate, Utc};
	use proptest::prelude::*;

	#[test]
	fn integers_of_every_width_convert() {
		assert_eq!(RawValue::from(-3i8), RawValue::Int(-3));
		assert_eq!(RawValue::from(7u16), RawValue::UInt(7));
		assert_eq!(RawValue::from(u64::MAX), RawValue::UInt(u64::MAX));
		assert_eq!(RawValue::from(i64::MIN), RawValue::Int(i64::MIN));
	}

	#[test]
	fn option_none_is_null() {
		assert!(RawValue::from(None::<&str>).is_null());
		assert_eq!(RawValue::from(Some("x")), RawValue::String("x".to_string()));
	}

	#[test]
	fn utc_datetime_keeps_instant() {
		let now = Utc::now();
		match RawValue::from(now) {
			RawValue::DateTime(dt) => assert_eq!(dt.timestamp(), now.timestamp()),
			other => panic!("unexpected shape: {other:?}"),
		}
	}

	#[test]
	fn naive_datetime_converts() {
		let naive = NaiveDate::from_ymd_opt(2024, 1, 2)
			.unwrap()
			.and_hms_opt(3, 4, 5)
			.unwrap();
		assert_eq!(RawValue::from(naive), RawValue::NaiveDateTime(naive));
	}

	#[test]
	fn json_object_keeps_key_order() {
		let value = serde_json::json!({"z": 1, "a": "two", "m": [true, null]});
		let raw = RawValue::from(value);
		match raw {
			RawValue::Map(entries) => {
				let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
				assert_eq!(keys, vec!["z", "a", "m"]);
				assert_eq!(
					entries[2].1,
					RawValue::Seq(vec![RawValue::Bool(true), RawValue::Null])
				);
			}
			other => panic!("unexpected shape: {other:?}"),
		}
	}

	#[test]
	fn json_large_unsigned_stays_unsigned() {
		let raw = RawValue::from(serde_json::json!(u64::MAX));
		assert_eq!(raw, RawValue::UInt(u64::MAX));
	}

	#[test]
	fn opaque_names_the_type() {
		let raw = RawValue::opaque::<std::fs::File>();
		assert_eq!(raw.shape(), "std::fs::File");
	}

	#[test]
	fn object_property_accessors() {
		let prop = ObjectProperty::new("Referred By", "Friend");
		assert_eq!(prop.raw_name(), "Referred By");
		assert_eq!(prop.value().as_str(), Some("Friend"));
		let (name, value) = prop.into_parts();
		assert_eq!(name, "Referred By");
		assert_eq!(value, RawValue::String("Friend".to_string()));
	}

	proptest! {
		#[test]
		fn string_conversion_is_lossless(s in ".*") {
			let raw = RawValue::from(s.as_str());
			prop_assert_eq!(raw.as_str(), Some(s.as_str()));
		}

		#[test]
		fn std_duration_becomes_delta(secs in 0u64..1_000_000_000) {
			let raw = RawValue::from(std::time::Duration::from_secs(secs));
			prop_assert_eq!(raw, RawValue::Duration(TimeDelta::seconds(secs as i64)));
		}
	}
}
