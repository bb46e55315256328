// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration values consumed by the message pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::special::MessageKind;

/// A configuration value string did not name a known option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseConfigValueError {
	kind: &'static str,
	value: String,
}

impl ParseConfigValueError {
	fn new(kind: &'static str, value: &str) -> Self {
		Self {
			kind,
			value: value.to_string(),
		}
	}
}

/// How `ip` properties and server-side IP detection are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpAddressHandling {
	/// Pass any supplied `ip` property through.
	#[default]
	None,
	/// Let the service geolocate from the request address.
	UseRequestIp,
	/// Auto-detection disabled; supplied `ip` properties are omitted.
	IgnoreRequestIp,
}

impl IpAddressHandling {
	/// Value of the `ip` query parameter for the ingestion request, if any.
	pub fn query_param(&self) -> Option<&'static str> {
		match self {
			IpAddressHandling::None => None,
			IpAddressHandling::UseRequestIp => Some("1"),
			IpAddressHandling::IgnoreRequestIp => Some("0"),
		}
	}
}

impl fmt::Display for IpAddressHandling {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => write!(f, "none"),
			Self::UseRequestIp => write!(f, "use_request_ip"),
			Self::IgnoreRequestIp => write!(f, "ignore_request_ip"),
		}
	}
}

impl FromStr for IpAddressHandling {
	type Err = ParseConfigValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"none" => Ok(Self::None),
			"use_request_ip" => Ok(Self::UseRequestIp),
			"ignore_request_ip" => Ok(Self::IgnoreRequestIp),
			_ => Err(ParseConfigValueError::new("ip address handling", s)),
		}
	}
}

/// How extracted property names are reformatted before they reach a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyNameFormat {
	#[default]
	None,
	/// `first_name` becomes `First name`.
	SentenceCase,
	/// `first_name` becomes `First Name`.
	TitleCase,
	/// `FirstName` becomes `first name`.
	LowerCase,
}

impl PropertyNameFormat {
	pub fn apply(&self, name: &str) -> String {
		if *self == PropertyNameFormat::None {
			return name.to_string();
		}

		let words = split_words(name);
		let formatted: Vec<String> = words
			.iter()
			.enumerate()
			.map(|(i, word)| match self {
				PropertyNameFormat::SentenceCase if i == 0 => capitalize(word),
				PropertyNameFormat::TitleCase => capitalize(word),
				_ => word.to_lowercase(),
			})
			.collect();
		formatted.join(" ")
	}
}

fn split_words(name: &str) -> Vec<String> {
	let mut words = Vec::new();
	let mut current = String::new();
	let mut prev: Option<char> = None;

	for c in name.chars() {
		if c == '_' || c == '-' || c.is_whitespace() {
			if !current.is_empty() {
				words.push(std::mem::take(&mut current));
			}
			prev = None;
			continue;
		}
		let boundary = c.is_uppercase()
			&& prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
		if boundary && !current.is_empty() {
			words.push(std::mem::take(&mut current));
		}
		current.push(c);
		prev = Some(c);
	}
	if !current.is_empty() {
		words.push(current);
	}
	words
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

impl fmt::Display for PropertyNameFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => write!(f, "none"),
			Self::SentenceCase => write!(f, "sentence_case"),
			Self::TitleCase => write!(f, "title_case"),
			Self::LowerCase => write!(f, "lower_case"),
		}
	}
}

impl FromStr for PropertyNameFormat {
	type Err = ParseConfigValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"none" => Ok(Self::None),
			"sentence_case" => Ok(Self::SentenceCase),
			"title_case" => Ok(Self::TitleCase),
			"lower_case" => Ok(Self::LowerCase),
			_ => Err(ParseConfigValueError::new("property name format", s)),
		}
	}
}

/// Which regional deployment of the tracking API receives data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataResidency {
	#[default]
	Us,
	Eu,
}

impl DataResidency {
	pub fn api_host(&self) -> &'static str {
		match self {
			DataResidency::Us => "api.mixpanel.com",
			DataResidency::Eu => "api-eu.mixpanel.com",
		}
	}
}

impl fmt::Display for DataResidency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Us => write!(f, "us"),
			Self::Eu => write!(f, "eu"),
		}
	}
}

impl FromStr for DataResidency {
	type Err = ParseConfigValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"us" => Ok(Self::Us),
			"eu" => Ok(Self::Eu),
			_ => Err(ParseConfigValueError::new("data residency", s)),
		}
	}
}

/// Settings that influence how messages are built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixpanelConfig {
	pub ip_address_handling: IpAddressHandling,
	/// Stamp the current time on messages that carry no `time` property.
	pub default_time: bool,
	pub property_name_format: PropertyNameFormat,
	pub data_residency: DataResidency,
}

impl MixpanelConfig {
	/// Full ingestion URL for messages of `kind`.
	pub fn endpoint(&self, kind: MessageKind) -> String {
		let base = format!("https://{}/{}", self.data_residency.api_host(), kind.path());
		match self.ip_address_handling.query_param() {
			Some(ip) => format!("{base}?ip={ip}"),
			None => base,
		}
	}
}
