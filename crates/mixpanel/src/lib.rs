// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK client for the Mixpanel tracking API.
//!
//! This crate provides:
//! - [`MixpanelClient`]: builds track, alias and people messages and encodes
//!   them for transport
//! - [`Properties`]: an insertion-ordered property builder
//! - [`SerdeExtractor`]: properties from any `Serialize` value
//! - Layered configuration from defaults, a TOML file and `MIXPANEL_*`
//!   environment variables
//!
//! Message construction lives in [`mixpanel_core`]. Sending messages is left
//! to the caller; every [`EncodedMessage`] carries its endpoint and body.
//!
//! # Usage
//!
//! ```
//! use mixpanel::{MixpanelClient, Properties, RawValue};
//!
//! let client = MixpanelClient::new("e3bc4100330c35722740fb8c6f5abddc");
//! let encoded = client
//!     .people_set(
//!         RawValue::from("13793"),
//!         Properties::new().insert("$name", "Bob").insert("plan", "pro"),
//!     )
//!     .unwrap();
//!
//! assert_eq!(encoded.endpoint, "https://api.mixpanel.com/engage");
//! ```

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod extract;
pub mod properties;

pub use client::{EncodedMessage, MixpanelClient};
pub use config::{
	load_config, load_config_with_file, ConfigError, ConfigSource, DefaultsSource, EnvSource,
	LoadedConfig, MixpanelConfigLayer, Precedence, TomlSource,
};
pub use encode::{EncodedPayload, JsonEncoder, MessageEncoder};
pub use error::{MixpanelError, Result};
pub use extract::{ExtractError, PropertyExtractor, SerdeExtractor};
pub use properties::Properties;

pub use mixpanel_core::{
	DataResidency, IpAddressHandling, Message, MessageBuildError, MessageKind, MixpanelConfig,
	ObjectProperty, PropertyNameFormat, RawValue, SkippedProperty,
};
