// ABOUTME: Unified vision provider selector for runtime provider switching
// ABOUTME: Abstracts over OpenAI and Gemini providers based on environment configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Vision Provider Selector
//!
//! Unified interface over the concrete vision providers, configured at
//! runtime via environment variables.
//!
//! ## Configuration
//!
//! Set `REDDYFIT_VISION_PROVIDER`:
//! - `openai` (default): GPT-4o class vision models
//! - `gemini`: Google Gemini vision models

use async_trait::async_trait;
use tracing::{debug, info};

use super::{GeminiVisionProvider, OpenAiVisionProvider, VisionCapabilities, VisionProvider};
use crate::config::VisionProviderType;
use crate::errors::AppError;
use crate::models::ImageData;

/// Unified vision provider that wraps `OpenAI` or Gemini.
///
/// Provides a consistent interface regardless of which underlying provider
/// is configured.
pub enum VisionClient {
    /// `OpenAI` GPT-4o vision provider
    OpenAi(OpenAiVisionProvider),
    /// Google Gemini vision provider
    Gemini(GeminiVisionProvider),
}

impl VisionClient {
    /// Create a provider from environment configuration.
    ///
    /// Reads `REDDYFIT_VISION_PROVIDER` to determine which provider to use
    /// and `REDDYFIT_VISION_MODEL` for the optional model override.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected provider's API key environment
    /// variable is missing.
    pub fn from_env() -> Result<Self, AppError> {
        let provider_type = VisionProviderType::from_env();

        info!(
            "Initializing vision provider: {} (set {} to change)",
            provider_type,
            VisionProviderType::ENV_VAR
        );

        let client = match provider_type {
            VisionProviderType::OpenAi => {
                let mut provider = OpenAiVisionProvider::from_env()?;
                if let Some(model) = VisionProviderType::model_from_env() {
                    provider = provider.with_default_model(model);
                }
                Self::OpenAi(provider)
            }
            VisionProviderType::Gemini => {
                let mut provider = GeminiVisionProvider::from_env()?;
                if let Some(model) = VisionProviderType::model_from_env() {
                    provider = provider.with_default_model(model);
                }
                Self::Gemini(provider)
            }
        };

        debug!(
            "Provider {} initialized with model: {}",
            client.display_name(),
            client.default_model()
        );

        Ok(client)
    }

    /// Access the wrapped provider as a trait object
    fn inner(&self) -> &dyn VisionProvider {
        match self {
            Self::OpenAi(p) => p,
            Self::Gemini(p) => p,
        }
    }
}

#[async_trait]
impl VisionProvider for VisionClient {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn capabilities(&self) -> VisionCapabilities {
        self.inner().capabilities()
    }

    fn default_model(&self) -> &str {
        match self {
            Self::OpenAi(p) => p.default_model(),
            Self::Gemini(p) => p.default_model(),
        }
    }

    fn available_models(&self) -> &'static [&'static str] {
        self.inner().available_models()
    }

    async fn analyze_images(
        &self,
        prompt: &str,
        images: &[ImageData],
    ) -> Result<String, AppError> {
        self.inner().analyze_images(prompt, images).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        self.inner().health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_provider_identity() {
        let client = VisionClient::OpenAi(OpenAiVisionProvider::new("k"));
        assert_eq!(client.name(), "openai");
        assert!(client.capabilities().supports_vision());

        let client = VisionClient::Gemini(GeminiVisionProvider::new("k"));
        assert_eq!(client.name(), "gemini");
        assert_eq!(client.default_model(), "gemini-2.5-flash");
    }
}
