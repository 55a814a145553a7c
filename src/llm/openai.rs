// ABOUTME: OpenAI vision provider implementation using the chat completions API
// ABOUTME: Sends prompt plus base64 image data URLs to GPT-4o class models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # `OpenAI` Vision Provider
//!
//! Implementation of the [`VisionProvider`] trait for `OpenAI` GPT-4o class
//! models via the chat completions API.
//!
//! ## Configuration
//!
//! Set the `OPENAI_API_KEY` environment variable. Override the model with
//! `REDDYFIT_VISION_MODEL` if needed.
//!
//! Images are sent as `data:` URLs with `detail: high` so the model runs
//! its high-resolution analysis pass.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{prompts, VisionCapabilities, VisionProvider};
use crate::errors::{AppError, ErrorCode};
use crate::models::ImageData;

/// Environment variable for the `OpenAI` API key
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default model to use
const DEFAULT_MODEL: &str = "gpt-4o";

/// Available vision-capable models
const AVAILABLE_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];

/// Base URL for the `OpenAI` API
const API_BASE_URL: &str = "https://api.openai.com/v1";

/// Token budget for a detailed body analysis response
const MAX_ANALYSIS_TOKENS: u32 = 2000;

/// Connection timeout for the API
const CONNECT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Chat completions request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
}

/// A single chat message; user content is a multi-part array for vision
#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: MessageContent,
}

/// Message content: plain text for system, parts for the vision payload
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal user message
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image reference with detail level
#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

/// Chat completions response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Option<Vec<Choice>>,
    error: Option<OpenAiError>,
}

/// Response choice
#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

/// Message within a response choice
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// API error payload
#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI` vision provider
pub struct OpenAiVisionProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl OpenAiVisionProvider {
    /// Create a new provider with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            api_key: api_key.into(),
            client,
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create a provider from the `OPENAI_API_KEY` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(OPENAI_API_KEY_ENV).map_err(|_| {
            AppError::config(format!("{OPENAI_API_KEY_ENV} environment variable not set"))
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Build the vision request body
    fn build_request(&self, prompt: &str, images: &[ImageData]) -> OpenAiRequest {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ContentPart::Text {
            text: prompt.to_owned(),
        });
        for image in images {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_data_url(),
                    detail: "high",
                },
            });
        }

        OpenAiRequest {
            model: self.default_model.clone(),
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: MessageContent::Text(prompts::get_body_system_prompt().to_owned()),
                },
                OpenAiMessage {
                    role: "user",
                    content: MessageContent::Parts(parts),
                },
            ],
            max_tokens: MAX_ANALYSIS_TOKENS,
        }
    }

    /// Map an HTTP error status to a provider error code
    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<OpenAiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        let code = match status {
            401 | 403 => ErrorCode::ProviderAuthFailed,
            429 => ErrorCode::ProviderRateLimited,
            500..=599 => ErrorCode::ProviderUnavailable,
            _ => ErrorCode::ProviderError,
        };
        AppError::new(code, format!("OpenAI API error ({status}): {message}"))
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn display_name(&self) -> &'static str {
        "OpenAI GPT-4o Vision"
    }

    fn capabilities(&self) -> VisionCapabilities {
        VisionCapabilities::VISION
            | VisionCapabilities::JSON_MODE
            | VisionCapabilities::SYSTEM_MESSAGES
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn available_models(&self) -> &'static [&'static str] {
        AVAILABLE_MODELS
    }

    #[instrument(skip(self, prompt, images), fields(model = %self.default_model, photos = images.len()))]
    async fn analyze_images(
        &self,
        prompt: &str,
        images: &[ImageData],
    ) -> Result<String, AppError> {
        let body = self.build_request(prompt, images);

        debug!("Sending vision analysis request to OpenAI");

        let response = self
            .client
            .post(format!("{API_BASE_URL}/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::provider("openai", format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::provider("openai", format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            error!(status = %status, "OpenAI API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = %e, "Failed to parse OpenAI response envelope");
            AppError::provider("openai", format!("Failed to parse response: {e}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(AppError::provider("openai", error.message));
        }

        parsed
            .choices
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::provider("openai", "No content in response"))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .client
            .get(format!("{API_BASE_URL}/models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::provider("openai", format!("Health check failed: {e}")))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let provider = OpenAiVisionProvider::new("test-key");
        let images = vec![ImageData::jpeg("QUJD"), ImageData::jpeg("REVG")];
        let request = provider.build_request("analyze", &images);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        let parts = json["messages"][1]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["detail"], "high");
        assert!(parts[2]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_error_mapping() {
        let err = OpenAiVisionProvider::map_api_error(429, "{\"error\":{\"message\":\"quota\"}}");
        assert_eq!(err.code, ErrorCode::ProviderRateLimited);

        let err = OpenAiVisionProvider::map_api_error(401, "denied");
        assert_eq!(err.code, ErrorCode::ProviderAuthFailed);

        let err = OpenAiVisionProvider::map_api_error(503, "down");
        assert_eq!(err.code, ErrorCode::ProviderUnavailable);
    }
}
