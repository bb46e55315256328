// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helper for building event and person properties.

use mixpanel_core::{ObjectProperty, RawValue};

/// An insertion-ordered builder of named properties.
///
/// Unlike a JSON object, values keep their rich type (date-times, UUIDs,
/// durations) until the message builder normalizes them.
///
/// # Example
///
/// ```
/// use mixpanel::Properties;
///
/// let props = Properties::new()
///     .insert("button_name", "checkout")
///     .insert("page", "/cart")
///     .insert("price", 99.99)
///     .insert("is_premium", true);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
	inner: Vec<ObjectProperty>,
}

impl Properties {
	/// Creates a new empty Properties builder.
	pub fn new() -> Self {
		Self { inner: Vec::new() }
	}

	/// Inserts a key-value pair.
	///
	/// Re-inserting an existing key replaces its value in place.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<RawValue>,
	{
		self.put(ObjectProperty::new(key, value));
		self
	}

	/// Merges another Properties into this one.
	///
	/// If both contain the same key, the value from `other` takes precedence.
	pub fn merge(mut self, other: Properties) -> Self {
		for property in other.inner {
			self.put(property);
		}
		self
	}

	fn put(&mut self, property: ObjectProperty) {
		match self
			.inner
			.iter_mut()
			.find(|p| p.raw_name() == property.raw_name())
		{
			Some(existing) => *existing = property,
			None => self.inner.push(property),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Gets a value by key.
	pub fn get(&self, key: &str) -> Option<&RawValue> {
		self
			.inner
			.iter()
			.find(|p| p.raw_name() == key)
			.map(ObjectProperty::value)
	}

	pub fn iter(&self) -> impl Iterator<Item = &ObjectProperty> {
		self.inner.iter()
	}

	pub fn into_object_properties(self) -> Vec<ObjectProperty> {
		self.inner
	}
}

impl From<Properties> for Vec<ObjectProperty> {
	fn from(props: Properties) -> Self {
		props.into_object_properties()
	}
}

impl IntoIterator for Properties {
	type Item = ObjectProperty;
	type IntoIter = std::vec::IntoIter<ObjectProperty>;

	fn into_iter(self) -> Self::IntoIter {
		self.inner.into_iter()
	}
}

impl FromIterator<ObjectProperty> for Properties {
	fn from_iter<T: IntoIterator<Item = ObjectProperty>>(iter: T) -> Self {
		let mut props = Properties::new();
		for property in iter {
			props.put(property);
		}
		props
	}
}
