// ABOUTME: Environment-only configuration for provider selection and engine limits
// ABOUTME: Defines VisionProviderType and EngineConfig with REDDYFIT_* variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Engine Configuration
//!
//! Environment-only configuration. Set `REDDYFIT_VISION_PROVIDER` to choose
//! the vision provider and `REDDYFIT_VISION_MODEL` to override its default
//! model. There is no configuration file; everything is read from the
//! process environment at startup.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Vision provider selection for body analysis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisionProviderType {
    /// `OpenAI` GPT-4o vision via the chat completions API (default)
    #[default]
    OpenAi,
    /// Google Gemini vision via the Generative AI API
    Gemini,
}

impl VisionProviderType {
    /// Environment variable name for provider selection
    pub const ENV_VAR: &'static str = "REDDYFIT_VISION_PROVIDER";

    /// Environment variable for model/version override
    pub const MODEL_ENV_VAR: &'static str = "REDDYFIT_VISION_MODEL";

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Self::Gemini,
            _ => Self::OpenAi, // Default fallback (including "openai")
        }
    }

    /// Load from environment variable
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }

    /// Get model override from environment
    ///
    /// Reads `REDDYFIT_VISION_MODEL` - returns None if not set, in which
    /// case the provider's default model is used.
    #[must_use]
    pub fn model_from_env() -> Option<String> {
        env::var(Self::MODEL_ENV_VAR).ok().filter(|s| !s.is_empty())
    }
}

impl Display for VisionProviderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Engine-wide limits and timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which vision provider to use
    pub provider: VisionProviderType,
    /// Timeout for a single provider call, in seconds
    pub provider_timeout_secs: u64,
    /// Maximum number of photos accepted per analysis request
    pub max_images: usize,
}

impl EngineConfig {
    /// Environment variable for the provider call timeout
    pub const TIMEOUT_ENV_VAR: &'static str = "REDDYFIT_PROVIDER_TIMEOUT_SECS";

    /// Default provider call timeout (matches the surrounding system)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Maximum photos per request (front, side, back)
    pub const MAX_IMAGES: usize = 3;

    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let provider_timeout_secs = env::var(Self::TIMEOUT_ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);

        Self {
            provider: VisionProviderType::from_env(),
            provider_timeout_secs,
            max_images: Self::MAX_IMAGES,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: VisionProviderType::default(),
            provider_timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            max_images: Self::MAX_IMAGES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(
            VisionProviderType::from_str_or_default("gemini"),
            VisionProviderType::Gemini
        );
        assert_eq!(
            VisionProviderType::from_str_or_default("GOOGLE"),
            VisionProviderType::Gemini
        );
        assert_eq!(
            VisionProviderType::from_str_or_default("openai"),
            VisionProviderType::OpenAi
        );
        assert_eq!(
            VisionProviderType::from_str_or_default("unknown"),
            VisionProviderType::OpenAi
        );
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.provider_timeout_secs, 60);
        assert_eq!(config.max_images, 3);
    }
}
