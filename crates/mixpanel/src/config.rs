// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered client configuration.
//!
//! Sources are applied in precedence order, later layers overriding earlier
//! ones field by field:
//! 1. Built-in defaults
//! 2. TOML config file
//! 3. Environment variables (`MIXPANEL_*`)
//!
//! ```toml
//! token = "e3bc4100330c35722740fb8c6f5abddc"
//! ip_address_handling = "ignore_request_ip"
//! default_time = true
//! property_name_format = "title_case"
//! data_residency = "eu"
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use mixpanel_core::{DataResidency, IpAddressHandling, MixpanelConfig, PropertyNameFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

pub const ENV_TOKEN: &str = "MIXPANEL_TOKEN";
pub const ENV_IP_ADDRESS_HANDLING: &str = "MIXPANEL_IP_ADDRESS_HANDLING";
pub const ENV_DEFAULT_TIME: &str = "MIXPANEL_DEFAULT_TIME";
pub const ENV_PROPERTY_NAME_FORMAT: &str = "MIXPANEL_PROPERTY_NAME_FORMAT";
pub const ENV_DATA_RESIDENCY: &str = "MIXPANEL_DATA_RESIDENCY";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}

/// One partially-specified configuration layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MixpanelConfigLayer {
	pub token: Option<String>,
	pub ip_address_handling: Option<IpAddressHandling>,
	pub default_time: Option<bool>,
	pub property_name_format: Option<PropertyNameFormat>,
	pub data_residency: Option<DataResidency>,
}

impl MixpanelConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.ip_address_handling.is_some() {
			self.ip_address_handling = other.ip_address_handling;
		}
		if other.default_time.is_some() {
			self.default_time = other.default_time;
		}
		if other.property_name_format.is_some() {
			self.property_name_format = other.property_name_format;
		}
		if other.data_residency.is_some() {
			self.data_residency = other.data_residency;
		}
	}

	pub fn finalize(self) -> LoadedConfig {
		LoadedConfig {
			token: self.token.filter(|t| !t.trim().is_empty()),
			config: MixpanelConfig {
				ip_address_handling: self.ip_address_handling.unwrap_or_default(),
				default_time: self.default_time.unwrap_or(false),
				property_name_format: self.property_name_format.unwrap_or_default(),
				data_residency: self.data_residency.unwrap_or_default(),
			},
		}
	}
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
	/// Project token. Optional here; messages without a token fail to build.
	pub token: Option<String>,
	pub config: MixpanelConfig,
}

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<MixpanelConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<MixpanelConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(MixpanelConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<MixpanelConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(MixpanelConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: MixpanelConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable source.
///
/// Convention: `MIXPANEL_<FIELD>`. Empty variables count as unset.
pub struct EnvSource {
	lookup: EnvLookup,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn new() -> Self {
		Self::with_lookup(|name| std::env::var(name).ok())
	}

	/// Reads variables through `lookup` instead of the process environment.
	pub fn with_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool_var(&self, name: &str) -> Result<Option<bool>, ConfigError> {
		match self.var(name) {
			Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(Some(true)),
			Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(Some(false)),
			Some(v) => Err(ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid bool value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	fn parsed_var<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|e: T::Err| ConfigError::InvalidValue {
				key: name.to_string(),
				message: e.to_string(),
			}),
			None => Ok(None),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<MixpanelConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(MixpanelConfigLayer {
			token: self.var(ENV_TOKEN),
			ip_address_handling: self.parsed_var(ENV_IP_ADDRESS_HANDLING)?,
			default_time: self.bool_var(ENV_DEFAULT_TIME)?,
			property_name_format: self.parsed_var(ENV_PROPERTY_NAME_FORMAT)?,
			data_residency: self.parsed_var(ENV_DATA_RESIDENCY)?,
		})
	}
}

/// Load configuration from defaults and the environment.
pub fn load_config() -> Result<LoadedConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource::new())])
}

/// Load configuration with a custom config file path.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`MIXPANEL_*`)
/// 2. Config file at `config_path`
/// 3. Built-in defaults
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<LoadedConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<LoadedConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = MixpanelConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	let loaded = merged.finalize();
	info!(
		token_set = loaded.token.is_some(),
		ip_address_handling = %loaded.config.ip_address_handling,
		default_time = loaded.config.default_time,
		property_name_format = %loaded.config.property_name_format,
		data_residency = %loaded.config.data_residency,
		"mixpanel configuration loaded"
	);
	Ok(loaded)
}
