// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rendering built messages into request bodies.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mixpanel_core::Message;
use tracing::trace;

use crate::error::Result;

/// A message rendered as compact JSON and as the base64 `data` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
	pub json: String,
	pub base64: String,
}

impl EncodedPayload {
	fn from_json(json: String) -> Self {
		let base64 = STANDARD.encode(json.as_bytes());
		Self { json, base64 }
	}
}

/// Serializes messages for the tracking API.
pub trait MessageEncoder: Send + Sync {
	fn encode(&self, message: &Message) -> Result<EncodedPayload>;

	/// Renders several messages as one JSON array.
	fn encode_batch(&self, messages: &[Message]) -> Result<EncodedPayload>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl MessageEncoder for JsonEncoder {
	fn encode(&self, message: &Message) -> Result<EncodedPayload> {
		let json = serde_json::to_string(message)?;
		trace!(bytes = json.len(), "encoded message");
		Ok(EncodedPayload::from_json(json))
	}

	fn encode_batch(&self, messages: &[Message]) -> Result<EncodedPayload> {
		let json = serde_json::to_string(messages)?;
		trace!(count = messages.len(), bytes = json.len(), "encoded batch");
		Ok(EncodedPayload::from_json(json))
	}
}
