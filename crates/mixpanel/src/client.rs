// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client facade that builds and encodes messages.

use mixpanel_core::builder::{alias, people, track};
use mixpanel_core::{
	Message, MessageKind, MixpanelConfig, ObjectProperty, PeopleOperation, RawValue,
	SkippedProperty,
};
use serde::Serialize;
use tracing::debug;

use crate::config::{load_config, LoadedConfig};
use crate::encode::{EncodedPayload, JsonEncoder, MessageEncoder};
use crate::error::Result;
use crate::extract::{PropertyExtractor, SerdeExtractor};
use crate::properties::Properties;

/// A built message ready for transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMessage {
	pub kind: MessageKind,
	/// Ingestion URL for this message, including the `ip` query parameter.
	pub endpoint: String,
	pub message: Message,
	pub json: String,
	/// The `data` form accepted by the tracking API.
	pub base64: String,
}

/// Builds Mixpanel messages for one project.
///
/// Super properties registered on the client are merged into every message
/// at the lowest precedence.
///
/// # Example
///
/// ```
/// use mixpanel::{MixpanelClient, Properties, RawValue};
///
/// let mut client = MixpanelClient::new("e3bc4100330c35722740fb8c6f5abddc");
/// client.register("app_version", "2.1.0");
///
/// let encoded = client
///     .track(
///         "Signed Up",
///         Some(RawValue::from("13793")),
///         Properties::new().insert("Referred By", "Friend"),
///     )
///     .unwrap();
///
/// assert_eq!(encoded.endpoint, "https://api.mixpanel.com/track");
/// ```
#[derive(Debug, Clone)]
pub struct MixpanelClient<E = JsonEncoder> {
	token: Option<String>,
	config: MixpanelConfig,
	super_properties: Vec<ObjectProperty>,
	encoder: E,
}

impl MixpanelClient<JsonEncoder> {
	pub fn new(token: impl Into<String>) -> Self {
		Self::with_config(Some(token.into()), MixpanelConfig::default())
	}

	/// A client without a token fails every build; the token may instead come
	/// from a registered `token` super property.
	pub fn with_config(token: Option<String>, config: MixpanelConfig) -> Self {
		Self {
			token,
			config,
			super_properties: Vec::new(),
			encoder: JsonEncoder,
		}
	}

	pub fn from_loaded(loaded: LoadedConfig) -> Self {
		Self::with_config(loaded.token, loaded.config)
	}

	/// Creates a client from defaults and `MIXPANEL_*` environment variables.
	pub fn from_env() -> Result<Self> {
		Ok(Self::from_loaded(load_config()?))
	}
}

impl<E: MessageEncoder> MixpanelClient<E> {
	pub fn with_encoder<F: MessageEncoder>(self, encoder: F) -> MixpanelClient<F> {
		MixpanelClient {
			token: self.token,
			config: self.config,
			super_properties: self.super_properties,
			encoder,
		}
	}

	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	pub fn config(&self) -> &MixpanelConfig {
		&self.config
	}

	pub fn super_properties(&self) -> &[ObjectProperty] {
		&self.super_properties
	}

	/// Registers a super property, replacing any earlier value in place.
	pub fn register(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
		let property = ObjectProperty::new(name, value);
		match self
			.super_properties
			.iter_mut()
			.find(|p| p.raw_name() == property.raw_name())
		{
			Some(existing) => *existing = property,
			None => self.super_properties.push(property),
		}
	}

	/// Registers every field of `object` as a super property. Fields named
	/// like a special property of any message kind keep their raw name.
	pub fn register_object<T: Serialize + ?Sized>(&mut self, object: &T) -> Result<()> {
		for property in self.extractor().extract(object)? {
			let (name, value) = property.into_parts();
			self.register(name, value);
		}
		Ok(())
	}

	pub fn unregister(&mut self, name: &str) -> bool {
		let before = self.super_properties.len();
		self.super_properties.retain(|p| p.raw_name() != name);
		before != self.super_properties.len()
	}

	pub fn clear_super_properties(&mut self) {
		self.super_properties.clear();
	}

	fn extractor(&self) -> SerdeExtractor {
		SerdeExtractor::new(self.config.property_name_format)
	}

	pub fn track(
		&self,
		event: &str,
		distinct_id: Option<RawValue>,
		properties: Properties,
	) -> Result<EncodedMessage> {
		let message = track::build(
			self.token(),
			Some(event),
			&self.super_properties,
			properties,
			distinct_id,
			&self.config,
		)?;
		self.finish(MessageKind::Track, message)
	}

	/// Tracks an event whose properties are the fields of `object`.
	pub fn track_object<T: Serialize + ?Sized>(
		&self,
		event: &str,
		distinct_id: Option<RawValue>,
		object: &T,
	) -> Result<EncodedMessage> {
		let properties =
			SerdeExtractor::for_kind(self.config.property_name_format, MessageKind::Track)
				.extract(object)?;
		self.track(event, distinct_id, properties.into_iter().collect())
	}

	/// Like [`track`](Self::track), also returning every property that was
	/// dropped because it failed to parse.
	pub fn track_with_diagnostics(
		&self,
		event: &str,
		distinct_id: Option<RawValue>,
		properties: Properties,
	) -> Result<(EncodedMessage, Vec<SkippedProperty>)> {
		let mut skipped = Vec::new();
		let message = track::build_with_diagnostics(
			self.token(),
			Some(event),
			&self.super_properties,
			properties,
			distinct_id,
			&self.config,
			&mut skipped,
		)?;
		Ok((self.finish(MessageKind::Track, message)?, skipped))
	}

	/// Links `alias` to the identity `distinct_id`.
	pub fn alias(&self, distinct_id: RawValue, alias: RawValue) -> Result<EncodedMessage> {
		let message = alias::build(
			self.token(),
			&self.super_properties,
			Some(distinct_id),
			Some(alias),
		)?;
		self.finish(MessageKind::Alias, message)
	}

	pub fn people_set(&self, distinct_id: RawValue, properties: Properties) -> Result<EncodedMessage> {
		self.people(PeopleOperation::Set, distinct_id, properties)
	}

	pub fn people_set_once(
		&self,
		distinct_id: RawValue,
		properties: Properties,
	) -> Result<EncodedMessage> {
		self.people(PeopleOperation::SetOnce, distinct_id, properties)
	}

	/// Increments numeric person properties. Non-numeric values are dropped.
	pub fn people_add(&self, distinct_id: RawValue, properties: Properties) -> Result<EncodedMessage> {
		self.people(PeopleOperation::Add, distinct_id, properties)
	}

	pub fn people_append(
		&self,
		distinct_id: RawValue,
		properties: Properties,
	) -> Result<EncodedMessage> {
		self.people(PeopleOperation::Append, distinct_id, properties)
	}

	/// Merges list values into person list properties. Values must be sequences.
	pub fn people_union(
		&self,
		distinct_id: RawValue,
		properties: Properties,
	) -> Result<EncodedMessage> {
		self.people(PeopleOperation::Union, distinct_id, properties)
	}

	pub fn people_remove(
		&self,
		distinct_id: RawValue,
		properties: Properties,
	) -> Result<EncodedMessage> {
		self.people(PeopleOperation::Remove, distinct_id, properties)
	}

	pub fn people_unset(&self, distinct_id: RawValue, property_names: &[&str]) -> Result<EncodedMessage> {
		let message = people::build_unset(
			self.token(),
			&self.super_properties,
			Some(distinct_id),
			property_names,
			&self.config,
		)?;
		self.finish(MessageKind::People, message)
	}

	/// Deletes the whole profile.
	pub fn people_delete(&self, distinct_id: RawValue) -> Result<EncodedMessage> {
		let message = people::build_delete(
			self.token(),
			&self.super_properties,
			Some(distinct_id),
			&self.config,
		)?;
		self.finish(MessageKind::People, message)
	}

	/// Records a charge of `amount` at `time`, or now when `time` is `None`.
	pub fn people_track_charge(
		&self,
		distinct_id: RawValue,
		amount: impl Into<RawValue>,
		time: Option<RawValue>,
	) -> Result<EncodedMessage> {
		let message = people::build_track_charge(
			self.token(),
			&self.super_properties,
			Some(distinct_id),
			amount.into(),
			time,
			&self.config,
		)?;
		self.finish(MessageKind::People, message)
	}

	/// Renders already-built messages as one batch request body.
	pub fn encode_batch(&self, messages: &[EncodedMessage]) -> Result<EncodedPayload> {
		let trees: Vec<Message> = messages.iter().map(|m| m.message.clone()).collect();
		self.encoder.encode_batch(&trees)
	}

	fn people(
		&self,
		operation: PeopleOperation,
		distinct_id: RawValue,
		properties: Properties,
	) -> Result<EncodedMessage> {
		let message = people::build(
			operation,
			self.token(),
			&self.super_properties,
			properties,
			Some(distinct_id),
			&self.config,
		)?;
		self.finish(MessageKind::People, message)
	}

	fn finish(&self, kind: MessageKind, message: Message) -> Result<EncodedMessage> {
		let EncodedPayload { json, base64 } = self.encoder.encode(&message)?;
		debug!(%kind, bytes = json.len(), "built message");
		Ok(EncodedMessage {
			kind,
			endpoint: self.config.endpoint(kind),
			message,
			json,
			base64,
		})
	}
}
