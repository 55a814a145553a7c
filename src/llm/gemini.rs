// ABOUTME: Google Gemini vision provider implementation via the Generative AI API
// ABOUTME: Sends prompt text plus inline base64 image data to Gemini models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Gemini Vision Provider
//!
//! Implementation of the [`VisionProvider`] trait for Google's Gemini
//! models. Images travel as `inline_data` parts alongside the prompt text.
//!
//! ## Configuration
//!
//! Set the `GEMINI_API_KEY` environment variable with your API key from
//! Google AI Studio.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{prompts, VisionCapabilities, VisionProvider};
use crate::errors::{AppError, ErrorCode};
use crate::models::ImageData;

/// Environment variable for the Gemini API key
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model to use
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Available vision-capable Gemini models
const AVAILABLE_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-1.5-pro", "gemini-1.5-flash"];

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Token budget for a detailed body analysis response
const MAX_ANALYSIS_TOKENS: u32 = 2000;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

/// Content structure for the Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

/// Part of content: prompt text or an inline image
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inline_data")]
        inline_data: InlineData,
    },
}

/// Inline base64 image payload
#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Generation configuration
#[derive(Debug, Serialize)]
struct GenerationConfig {
    max_output_tokens: u32,
    candidate_count: u32,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

/// API error response from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini vision provider
pub struct GeminiVisionProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiVisionProvider {
    /// Create a new Gemini provider with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create a provider from the `GEMINI_API_KEY` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            AppError::config(format!("{GEMINI_API_KEY_ENV} environment variable not set"))
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Build the API URL for a model and method
    fn build_url(&self, model: &str, method: &str) -> String {
        format!(
            "{API_BASE_URL}/models/{model}:{method}?key={}",
            self.api_key
        )
    }

    /// Build the vision request body
    fn build_request(prompt: &str, images: &[ImageData]) -> GeminiRequest {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ContentPart::Text {
            text: prompt.to_owned(),
        });
        for image in images {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.base64.clone(),
                },
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts,
            }],
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![ContentPart::Text {
                    text: prompts::get_body_system_prompt().to_owned(),
                }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: MAX_ANALYSIS_TOKENS,
                candidate_count: 1,
            },
        }
    }

    /// Extract the first text part from a Gemini response
    fn extract_content(response: GeminiResponse) -> Result<String, AppError> {
        response
            .candidates
            .and_then(|mut c| (!c.is_empty()).then(|| c.swap_remove(0)))
            .and_then(|c| c.content)
            .and_then(|c| {
                c.parts.into_iter().find_map(|p| match p {
                    ContentPart::Text { text } => Some(text),
                    ContentPart::InlineData { .. } => None,
                })
            })
            .ok_or_else(|| AppError::provider("gemini", "No content in response"))
    }

    /// Map an HTTP error status to a provider error code
    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        let code = match status {
            401 | 403 => ErrorCode::ProviderAuthFailed,
            429 => ErrorCode::ProviderRateLimited,
            500..=599 => ErrorCode::ProviderUnavailable,
            _ => ErrorCode::ProviderError,
        };
        AppError::new(code, format!("Gemini API error ({status}): {message}"))
    }
}

#[async_trait]
impl VisionProvider for GeminiVisionProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini Vision"
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
        let url = self.build_url(&self.default_model, "generateContent");
        let body = Self::build_request(prompt, images);

        debug!("Sending vision analysis request to Gemini");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::provider("gemini", format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::provider("gemini", format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response envelope");
            AppError::provider("gemini", format!("Failed to parse response: {e}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(AppError::provider("gemini", error.message));
        }

        Self::extract_content(parsed)
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let url = format!("{API_BASE_URL}/models?key={}", self.api_key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::provider("gemini", format!("Health check failed: {e}")))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let images = vec![ImageData::jpeg("QUJD")];
        let request = GeminiVisionProvider::build_request("analyze", &images);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "analyze");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "QUJD");
        assert!(json["system_instruction"].is_object());
    }

    #[test]
    fn test_extract_content_prefers_text_part() {
        let response = GeminiResponse {
            candidates: Some(vec![Candidate {
                content: Some(GeminiContent {
                    role: Some("model".to_owned()),
                    parts: vec![ContentPart::Text {
                        text: "{\"bodyFatPercentage\": 15.5}".to_owned(),
                    }],
                }),
            }]),
            error: None,
        };
        let content = GeminiVisionProvider::extract_content(response).unwrap();
        assert!(content.contains("bodyFatPercentage"));
    }

    #[test]
    fn test_error_mapping() {
        let err = GeminiVisionProvider::map_api_error(429, "quota");
        assert_eq!(err.code, ErrorCode::ProviderRateLimited);
    }
}
