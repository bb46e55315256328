// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Message builders.
//!
//! Required identity fields fail the whole message. Optional properties that
//! fail to parse are dropped and the message still succeeds; the
//! `*_with_diagnostics` entry points report what was dropped.

pub mod alias;
pub mod people;
pub mod track;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::candidate::MessageCandidate;
use crate::config::MixpanelConfig;
use crate::parse::special;
use crate::result::{MessageBuildError, SkippedProperty, ValueParseError};
use crate::special::{MessageKind, SpecialProperty, SpecialPropertyMapper};
use crate::value::{ObjectProperty, RawValue};

/// A candidate whose token has been validated.
#[derive(Debug)]
pub(crate) struct TokenCandidate {
	pub candidate: MessageCandidate,
	pub token: Value,
}

/// Builds the candidate and validates its token. Shared by every builder so
/// a missing token reads the same everywhere.
pub(crate) fn candidate_with_token<I>(
	kind: MessageKind,
	token: Option<&str>,
	super_properties: &[ObjectProperty],
	raw_properties: I,
	distinct_id: Option<RawValue>,
	config: &MixpanelConfig,
) -> Result<TokenCandidate, MessageBuildError>
where
	I: IntoIterator<Item = ObjectProperty>,
{
	let candidate = MessageCandidate::new(
		token,
		super_properties,
		raw_properties,
		distinct_id,
		config,
		SpecialPropertyMapper::for_kind(kind),
	);

	let raw_token = candidate
		.special_property(SpecialProperty::Token)
		.ok_or_else(|| MessageBuildError::new("'token' is not set."))?;
	let token = special::token(raw_token.value()).map_err(|e| {
		MessageBuildError::with_details("'token' is not valid.", e.details())
	})?;

	Ok(TokenCandidate { candidate, token })
}

/// Resolves a required identity property, failing the message if it is
/// missing or unparseable.
pub(crate) fn required_identity(
	candidate: &MessageCandidate,
	property: SpecialProperty,
) -> Result<Value, MessageBuildError> {
	let name = property.key(MessageKind::Track);
	let raw = candidate
		.special_property(property)
		.ok_or_else(|| MessageBuildError::new(format!("'{name}' is not set.")))?;
	special::parse(property, raw.value()).map_err(|e| {
		MessageBuildError::with_details(format!("'{name}' is not valid."), e.details())
	})
}

pub(crate) fn unix_now() -> Value {
	Value::from(Utc::now().timestamp())
}

/// Adds the current time unless a time property already resolved.
pub(crate) fn stamp_default_time(specials: &mut Vec<(SpecialProperty, Value)>) {
	if specials.iter().all(|(p, _)| *p != SpecialProperty::Time) {
		specials.push((SpecialProperty::Time, unix_now()));
		specials.sort_by_key(|(p, _)| *p);
	}
}

/// Records properties dropped under the best-effort policy.
pub(crate) struct SkipLog<'a> {
	sink: Option<&'a mut Vec<SkippedProperty>>,
}

impl<'a> SkipLog<'a> {
	pub fn silent() -> Self {
		Self { sink: None }
	}

	pub fn collecting(sink: &'a mut Vec<SkippedProperty>) -> Self {
		Self { sink: Some(sink) }
	}

	pub fn skip(&mut self, name: &str, error: &ValueParseError) {
		debug!(property = %name, reason = %error, "dropping property that failed to parse");
		if let Some(sink) = self.sink.as_deref_mut() {
			sink.push(SkippedProperty {
				name: name.to_string(),
				reason: error.details().to_string(),
			});
		}
	}
}
