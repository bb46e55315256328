// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turning caller objects into ordered name/value pairs.

use mixpanel_core::{
	MessageKind, ObjectProperty, PropertyNameFormat, RawValue, SpecialPropertyMapper,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
	#[error("expected an object with named fields, got {shape}")]
	NotAnObject { shape: &'static str },

	#[error("failed to serialize properties: {0}")]
	Serialize(#[from] serde_json::Error),
}

/// Produces ordered properties from an arbitrary object.
pub trait PropertyExtractor<T: ?Sized> {
	fn extract(&self, source: &T) -> Result<Vec<ObjectProperty>, ExtractError>;
}

/// Extracts the fields of any [`Serialize`] value.
///
/// Structs and maps yield one property per field, in serialization order.
/// `None` fields become null properties.
///
/// Field names are formatted per [`PropertyNameFormat`], except names that
/// resolve to a special property; those stay raw so the message builders
/// still recognize them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeExtractor {
	format: PropertyNameFormat,
	kind: Option<MessageKind>,
}

impl SerdeExtractor {
	/// An extractor for properties that may feed any message kind.
	pub fn new(format: PropertyNameFormat) -> Self {
		Self { format, kind: None }
	}

	/// An extractor for properties of one message kind only.
	pub fn for_kind(format: PropertyNameFormat, kind: MessageKind) -> Self {
		Self {
			format,
			kind: Some(kind),
		}
	}

	fn is_special(&self, name: &str) -> bool {
		let resolves = |kind| SpecialPropertyMapper::for_kind(kind).resolve(name).is_some();
		match self.kind {
			Some(kind) => resolves(kind),
			None => resolves(MessageKind::Track) || resolves(MessageKind::People),
		}
	}

	fn format_name(&self, name: String) -> String {
		if self.is_special(&name) {
			name
		} else {
			self.format.apply(&name)
		}
	}
}

impl<T: Serialize + ?Sized> PropertyExtractor<T> for SerdeExtractor {
	fn extract(&self, source: &T) -> Result<Vec<ObjectProperty>, ExtractError> {
		match serde_json::to_value(source)? {
			Value::Object(fields) => Ok(fields
				.into_iter()
				.map(|(name, value)| {
					ObjectProperty::new(self.format_name(name), RawValue::from(value))
				})
				.collect()),
			other => Err(ExtractError::NotAnObject {
				shape: json_shape(&other),
			}),
		}
	}
}

fn json_shape(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
