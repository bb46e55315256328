// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Mixpanel SDK.

use mixpanel_core::MessageBuildError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::extract::ExtractError;

/// Mixpanel SDK errors.
#[derive(Debug, Error)]
pub enum MixpanelError {
	/// A required message field was missing or invalid.
	#[error("message could not be built: {0}")]
	Build(#[from] MessageBuildError),

	/// Properties could not be read from a caller object.
	#[error("property extraction failed: {0}")]
	Extraction(#[from] ExtractError),

	/// The built message could not be rendered.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),
}

/// Result type alias for Mixpanel SDK operations.
pub type Result<T> = std::result::Result<T, MixpanelError>;
