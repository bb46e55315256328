// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alias messages: `{ "event": "$create_alias", "properties": { token, distinct_id, alias } }`.
//!
//! Unlike track, every field is required: an alias without both identities
//! resolving is meaningless.

use serde_json::{Map, Value};

use super::{candidate_with_token, required_identity};
use crate::config::MixpanelConfig;
use crate::parse::special;
use crate::result::{Message, MessageBuildError, MessageBuildResult};
use crate::special::{MessageKind, SpecialProperty};
use crate::value::{ObjectProperty, RawValue};

pub const CREATE_ALIAS_EVENT: &str = "$create_alias";

pub fn build(
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	distinct_id: Option<RawValue>,
	alias: Option<RawValue>,
) -> MessageBuildResult {
	let resolved = candidate_with_token(
		MessageKind::Alias,
		token,
		super_properties,
		std::iter::empty::<ObjectProperty>(),
		distinct_id,
		&MixpanelConfig::default(),
	)?;

	let distinct_id = required_identity(&resolved.candidate, SpecialProperty::DistinctId)?;

	let alias_name = SpecialProperty::Alias.key(MessageKind::Alias);
	let alias = alias
		.filter(|v| !v.is_null())
		.ok_or_else(|| MessageBuildError::new(format!("'{alias_name}' is not set.")))?;
	let alias = special::parse(SpecialProperty::Alias, &alias).map_err(|e| {
		MessageBuildError::with_details(format!("'{alias_name}' is not valid."), e.details())
	})?;

	let mut properties = Map::new();
	properties.insert(
		SpecialProperty::Token.key(MessageKind::Alias).to_string(),
		resolved.token,
	);
	properties.insert(
		SpecialProperty::DistinctId.key(MessageKind::Alias).to_string(),
		distinct_id,
	);
	properties.insert(alias_name.to_string(), alias);

	let mut message = Map::new();
	message.insert(
		SpecialProperty::Event.key(MessageKind::Alias).to_string(),
		Value::from(CREATE_ALIAS_EVENT),
	);
	message.insert("properties".to_string(), Value::Object(properties));
	Ok(Message::new(message))
}
