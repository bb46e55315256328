// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Result types threaded through parsers and builders.
//!
//! Validation outcomes are values, never panics: a parser returns a
//! [`ValueParseResult`] and a builder returns a [`MessageBuildResult`], and
//! callers decide whether a failure is fatal or can be absorbed.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a single value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{details}")]
pub struct ValueParseError {
	details: String,
}

impl ValueParseError {
	pub fn new(details: impl Into<String>) -> Self {
		Self {
			details: details.into(),
		}
	}

	pub fn details(&self) -> &str {
		&self.details
	}
}

/// Outcome of parsing one property value.
pub type ValueParseResult = Result<Value, ValueParseError>;

/// Why a whole message could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}{}", .details.as_ref().map(|d| format!(" {d}")).unwrap_or_default())]
pub struct MessageBuildError {
	error: String,
	details: Option<String>,
}

impl MessageBuildError {
	pub fn new(error: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			details: None,
		}
	}

	pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			details: Some(details.into()),
		}
	}

	pub fn error(&self) -> &str {
		&self.error
	}

	pub fn details(&self) -> Option<&str> {
		self.details.as_deref()
	}
}

/// Outcome of building one message.
pub type MessageBuildResult = Result<Message, MessageBuildError>;

/// A constructed message: nested mappings, sequences and JSON scalars only,
/// in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
	pub(crate) fn new(inner: Map<String, Value>) -> Self {
		Self(inner)
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// The `properties` mapping of track and alias messages.
	pub fn properties(&self) -> Option<&Map<String, Value>> {
		self.0.get("properties").and_then(Value::as_object)
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}

impl From<Message> for Value {
	fn from(message: Message) -> Self {
		message.into_value()
	}
}

/// An optional property a builder dropped instead of failing the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProperty {
	pub name: String,
	pub reason: String,
}
