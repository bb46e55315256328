// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Protocol-defined ("special") properties and the raw-name lookup tables.

use std::fmt;

/// The kind of message being built. Selects the special-property table and
/// the output key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
	Track,
	Alias,
	People,
}

impl MessageKind {
	/// Path of the ingestion endpoint accepting this kind of message.
	pub fn path(&self) -> &'static str {
		match self {
			MessageKind::Track | MessageKind::Alias => "track",
			MessageKind::People => "engage",
		}
	}
}

impl fmt::Display for MessageKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Track => write!(f, "track"),
			Self::Alias => write!(f, "alias"),
			Self::People => write!(f, "people"),
		}
	}
}

/// Canonical identifiers for protocol-defined properties.
///
/// Declaration order is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecialProperty {
	Token,
	DistinctId,
	Event,
	Time,
	IpAddress,
	InsertId,
	Alias,
	IgnoreTime,
	IgnoreAlias,
	FirstName,
	LastName,
	Name,
	Email,
	Phone,
}

impl SpecialProperty {
	/// Output key for this property in a message of the given kind.
	pub fn key(self, kind: MessageKind) -> &'static str {
		match (self, kind) {
			(Self::Token, MessageKind::People) => "$token",
			(Self::DistinctId, MessageKind::People) => "$distinct_id",
			(Self::Time, MessageKind::People) => "$time",
			(Self::IpAddress, MessageKind::People) => "$ip",
			(Self::Token, _) => "token",
			(Self::DistinctId, _) => "distinct_id",
			(Self::Time, _) => "time",
			(Self::IpAddress, _) => "ip",
			(Self::Event, _) => "event",
			(Self::InsertId, _) => "$insert_id",
			(Self::Alias, _) => "alias",
			(Self::IgnoreTime, _) => "$ignore_time",
			(Self::IgnoreAlias, _) => "$ignore_alias",
			(Self::FirstName, _) => "$first_name",
			(Self::LastName, _) => "$last_name",
			(Self::Name, _) => "$name",
			(Self::Email, _) => "$email",
			(Self::Phone, _) => "$phone",
		}
	}

	/// Whether this property belongs inside a people `$set` payload rather
	/// than at the top level of the message.
	pub fn is_person_attribute(self) -> bool {
		matches!(
			self,
			Self::FirstName | Self::LastName | Self::Name | Self::Email | Self::Phone
		)
	}
}


const TRACK_TABLE: &[(&str, SpecialProperty)] = &[
	("token", SpecialProperty::Token),
	("$token", SpecialProperty::Token),
	("distinct_id", SpecialProperty::DistinctId),
	("$distinct_id", SpecialProperty::DistinctId),
	("time", SpecialProperty::Time),
	("$time", SpecialProperty::Time),
	("ip", SpecialProperty::IpAddress),
	("$ip", SpecialProperty::IpAddress),
	("$insert_id", SpecialProperty::InsertId),
	("insert_id", SpecialProperty::InsertId),
];

const PEOPLE_TABLE: &[(&str, SpecialProperty)] = &[
	("token", SpecialProperty::Token),
	("$token", SpecialProperty::Token),
	("distinct_id", SpecialProperty::DistinctId),
	("$distinct_id", SpecialProperty::DistinctId),
	("time", SpecialProperty::Time),
	("$time", SpecialProperty::Time),
	("ip", SpecialProperty::IpAddress),
	("$ip", SpecialProperty::IpAddress),
	("ignore_time", SpecialProperty::IgnoreTime),
	("$ignore_time", SpecialProperty::IgnoreTime),
	("ignore_alias", SpecialProperty::IgnoreAlias),
	("$ignore_alias", SpecialProperty::IgnoreAlias),
	("first_name", SpecialProperty::FirstName),
	("$first_name", SpecialProperty::FirstName),
	("last_name", SpecialProperty::LastName),
	("$last_name", SpecialProperty::LastName),
	("name", SpecialProperty::Name),
	("$name", SpecialProperty::Name),
	("email", SpecialProperty::Email),
	("$email", SpecialProperty::Email),
	("phone", SpecialProperty::Phone),
	("$phone", SpecialProperty::Phone),
];

/// Immutable lookup from raw property names to special properties.
///
/// Matching is case-sensitive and exact. Tables are compiled in, so a
/// mapper can be shared freely between threads.
#[derive(Debug)]
pub struct SpecialPropertyMapper {
	table: &'static [(&'static str, SpecialProperty)],
}

static TRACK_MAPPER: SpecialPropertyMapper = SpecialPropertyMapper { table: TRACK_TABLE };
static PEOPLE_MAPPER: SpecialPropertyMapper = SpecialPropertyMapper {
	table: PEOPLE_TABLE,
};

impl SpecialPropertyMapper {
	/// Returns the mapper used for messages of `kind`.
	pub fn for_kind(kind: MessageKind) -> &'static SpecialPropertyMapper {
		match kind {
			MessageKind::Track | MessageKind::Alias => &TRACK_MAPPER,
			MessageKind::People => &PEOPLE_MAPPER,
		}
	}

	/// Resolves a raw property name, or `None` for a user property.
	pub fn resolve(&self, raw_name: &str) -> Option<SpecialProperty> {
		self
			.table
			.iter()
			.find(|(name, _)| *name == raw_name)
			.map(|(_, property)| *property)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn track_resolves_documented_names() {
		let mapper = SpecialPropertyMapper::for_kind(MessageKind::Track);
		assert_eq!(mapper.resolve("token"), Some(SpecialProperty::Token));
		assert_eq!(mapper.resolve("distinct_id"), Some(SpecialProperty::DistinctId));
		assert_eq!(mapper.resolve("ip"), Some(SpecialProperty::IpAddress));
		assert_eq!(mapper.resolve("time"), Some(SpecialProperty::Time));
		assert_eq!(mapper.resolve("$insert_id"), Some(SpecialProperty::InsertId));
	}

	#[test]
	fn resolution_is_case_sensitive() {
		let mapper = SpecialPropertyMapper::for_kind(MessageKind::Track);
		assert_eq!(mapper.resolve("Token"), None);
		assert_eq!(mapper.resolve("DISTINCT_ID"), None);
		assert_eq!(mapper.resolve(" ip"), None);
	}

	#[test]
	fn track_ignores_person_attributes() {
		let mapper = SpecialPropertyMapper::for_kind(MessageKind::Track);
		assert_eq!(mapper.resolve("$email"), None);
		assert_eq!(mapper.resolve("name"), None);
	}

	#[test]
	fn people_resolves_person_attributes() {
		let mapper = SpecialPropertyMapper::for_kind(MessageKind::People);
		assert_eq!(mapper.resolve("$email"), Some(SpecialProperty::Email));
		assert_eq!(mapper.resolve("first_name"), Some(SpecialProperty::FirstName));
		assert_eq!(mapper.resolve("$ignore_time"), Some(SpecialProperty::IgnoreTime));
		assert_eq!(mapper.resolve("$insert_id"), None);
	}

	#[test]
	fn alias_shares_the_track_table() {
		assert!(std::ptr::eq(
			SpecialPropertyMapper::for_kind(MessageKind::Alias),
			SpecialPropertyMapper::for_kind(MessageKind::Track)
		));
	}

	#[test]
	fn people_keys_are_dollar_prefixed() {
		assert_eq!(SpecialProperty::Token.key(MessageKind::People), "$token");
		assert_eq!(SpecialProperty::Token.key(MessageKind::Track), "token");
		assert_eq!(SpecialProperty::IpAddress.key(MessageKind::People), "$ip");
		assert_eq!(SpecialProperty::InsertId.key(MessageKind::Track), "$insert_id");
	}

	#[test]
	fn canonical_order_puts_identity_first() {
		assert!(SpecialProperty::Token < SpecialProperty::DistinctId);
		assert!(SpecialProperty::DistinctId < SpecialProperty::Time);
		assert!(SpecialProperty::Time < SpecialProperty::IpAddress);
	}

	#[test]
	fn every_table_name_resolves_to_itself() {
		for (kind, table) in [
			(MessageKind::Track, TRACK_TABLE),
			(MessageKind::People, PEOPLE_TABLE),
		] {
			let mapper = SpecialPropertyMapper::for_kind(kind);
			for (name, property) in table {
				assert_eq!(mapper.resolve(name), Some(*property), "{name} should resolve");
			}
		}
	}

	proptest! {
		#[test]
		fn unknown_names_never_resolve(name in "[A-Z][a-zA-Z ]{0,20}") {
			let mapper = SpecialPropertyMapper::for_kind(MessageKind::People);
			prop_assert_eq!(mapper.resolve(&name), None);
		}
	}
}
