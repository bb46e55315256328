// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Message construction for the Mixpanel tracking API.
//!
//! This crate turns loosely-typed caller data into well-formed tracking
//! messages. It is used by the `mixpanel` SDK crate, which owns
//! configuration loading, property extraction and encoding.
//!
//! # Overview
//!
//! - [`RawValue`] / [`ObjectProperty`]: caller values before validation
//! - [`SpecialPropertyMapper`]: raw names to protocol-defined properties
//! - [`parse`]: per-type validators returning [`ValueParseResult`]
//! - [`MessageCandidate`]: merges super, raw and explicit properties
//! - [`builder`]: track, alias and people message builders returning
//!   [`MessageBuildResult`]
//!
//! Builders never panic on caller data. Missing required fields fail the
//! message; optional properties that fail to parse are dropped.
//!
//! # Example
//!
//! ```
//! use mixpanel_core::{builder::track, MixpanelConfig, ObjectProperty, RawValue};
//!
//! let message = track::build(
//!     Some("e3bc4100330c35722740fb8c6f5abddc"),
//!     Some("Signed Up"),
//!     &[],
//!     vec![ObjectProperty::new("Referred By", "Friend")],
//!     Some(RawValue::from("13793")),
//!     &MixpanelConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(message.properties().unwrap()["Referred By"], "Friend");
//! ```

pub mod builder;
pub mod candidate;
pub mod config;
pub mod parse;
pub mod result;
pub mod special;
pub mod value;

pub use builder::people::PeopleOperation;
pub use candidate::MessageCandidate;
pub use config::{
	DataResidency, IpAddressHandling, MixpanelConfig, ParseConfigValueError, PropertyNameFormat,
};
pub use result::{
	Message, MessageBuildError, MessageBuildResult, SkippedProperty, ValueParseError,
	ValueParseResult,
};
pub use special::{MessageKind, SpecialProperty, SpecialPropertyMapper};
pub use value::{ObjectProperty, RawValue};
