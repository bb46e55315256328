// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Merging and classification of property sources for one message.
//!
//! Sources are applied from lowest to highest precedence:
//!
//! 1. super properties
//! 2. raw (per-call) properties
//! 3. the explicit token
//! 4. the explicit distinct id
//!
//! A later value for the same name replaces the earlier one, and a later
//! value for the same special property replaces the earlier one even when
//! it arrived under a different alias. User properties keep the position of
//! their first occurrence.

use std::collections::{BTreeMap, HashMap};

use crate::config::{IpAddressHandling, MixpanelConfig};
use crate::special::{SpecialProperty, SpecialPropertyMapper};
use crate::value::{ObjectProperty, RawValue};

/// All properties for one outgoing message, resolved and classified.
#[derive(Debug, Clone, Default)]
pub struct MessageCandidate {
	special_properties: BTreeMap<SpecialProperty, ObjectProperty>,
	user_properties: Vec<ObjectProperty>,
	user_index: HashMap<String, usize>,
}

impl MessageCandidate {
	pub fn new<I>(
		token: Option<&str>,
		super_properties: &[ObjectProperty],
		raw_properties: I,
		distinct_id: Option<RawValue>,
		config: &MixpanelConfig,
		mapper: &SpecialPropertyMapper,
	) -> Self
	where
		I: IntoIterator<Item = ObjectProperty>,
	{
		let mut candidate = Self::default();

		for property in super_properties {
			candidate.absorb(property.clone(), config, mapper);
		}
		for property in raw_properties {
			candidate.absorb(property, config, mapper);
		}
		if let Some(token) = token {
			candidate
				.special_properties
				.insert(SpecialProperty::Token, ObjectProperty::new("token", token));
		}
		if let Some(distinct_id) = distinct_id.filter(|v| !v.is_null()) {
			candidate.special_properties.insert(
				SpecialProperty::DistinctId,
				ObjectProperty::new("distinct_id", distinct_id),
			);
		}

		candidate
	}

	fn absorb(
		&mut self,
		property: ObjectProperty,
		config: &MixpanelConfig,
		mapper: &SpecialPropertyMapper,
	) {
		match mapper.resolve(property.raw_name()) {
			Some(SpecialProperty::IpAddress)
				if config.ip_address_handling == IpAddressHandling::IgnoreRequestIp => {}
			Some(special) => {
				self.special_properties.insert(special, property);
			}
			None => self.insert_user(property),
		}
	}

	fn insert_user(&mut self, property: ObjectProperty) {
		match self.user_index.get(property.raw_name()) {
			Some(&index) => self.user_properties[index] = property,
			None => {
				self
					.user_index
					.insert(property.raw_name().to_string(), self.user_properties.len());
				self.user_properties.push(property);
			}
		}
	}

	pub fn special_property(&self, property: SpecialProperty) -> Option<&ObjectProperty> {
		self.special_properties.get(&property)
	}

	/// Special properties in canonical order.
	pub fn special_properties(&self) -> impl Iterator<Item = (SpecialProperty, &ObjectProperty)> {
		self.special_properties.iter().map(|(k, v)| (*k, v))
	}

	/// User properties in first-seen order.
	pub fn user_properties(&self) -> impl Iterator<Item = &ObjectProperty> {
		self.user_properties.iter()
	}
}
