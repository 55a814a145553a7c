// ABOUTME: Unified error handling with standard error codes and HTTP response formatting
// ABOUTME: Defines AppError, ErrorCode, and the extraction/provider failure taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Unified Error Handling System
//!
//! Centralized error handling for the analysis engine. Defines standard error
//! types, error codes, and HTTP response formatting so the embedding service
//! can translate failures consistently.
//!
//! Two error categories cross the engine boundary (everything else in the
//! pipeline is total by design):
//!
//! - Provider failures (`ProviderError` and friends): the external vision
//!   call failed. Retryable by the caller.
//! - [`ErrorCode::ExtractionFailed`]: all extraction strategies were
//!   exhausted. The error carries a truncated sample of the raw text plus
//!   each stage's failure reason in `context.details`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// The provided input is invalid
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A value is outside its acceptable range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3001,

    // Extraction (4000-4999)
    /// All extraction strategies failed to recover structured data
    #[serde(rename = "EXTRACTION_FAILED")]
    ExtractionFailed = 4000,

    // External provider (5000-5999)
    /// The vision provider call failed
    #[serde(rename = "PROVIDER_ERROR")]
    ProviderError = 5000,
    /// The vision provider is unreachable or returned 5xx
    #[serde(rename = "PROVIDER_UNAVAILABLE")]
    ProviderUnavailable = 5001,
    /// Authentication with the vision provider failed
    #[serde(rename = "PROVIDER_AUTH_FAILED")]
    ProviderAuthFailed = 5002,
    /// The vision provider rate limited the request
    #[serde(rename = "PROVIDER_RATE_LIMITED")]
    ProviderRateLimited = 5003,
    /// The vision provider call exceeded the configured timeout
    #[serde(rename = "PROVIDER_TIMEOUT")]
    ProviderTimeout = 5004,

    // Configuration (6000-6999)
    /// Configuration error encountered
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration is missing
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,

    // Internal (9000-9999)
    /// An internal engine error occurred
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Data serialization or deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9001,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidInput | Self::ValueOutOfRange => 400,

            // 422 Unprocessable Entity: the upstream generator produced
            // unusable output; the request itself was well-formed
            Self::ExtractionFailed => 422,

            // 502 Bad Gateway
            Self::ProviderError | Self::ProviderUnavailable => 502,

            // 503 Service Unavailable
            Self::ProviderAuthFailed | Self::ProviderRateLimited => 503,

            // 504 Gateway Timeout
            Self::ProviderTimeout => 504,

            // 500 Internal Server Error
            Self::ConfigError
            | Self::ConfigMissing
            | Self::InternalError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ExtractionFailed => {
                "Could not extract structured analysis data from the provider response"
            }
            Self::ProviderError => "The vision provider encountered an error",
            Self::ProviderUnavailable => "The vision provider is currently unavailable",
            Self::ProviderAuthFailed => "Authentication with the vision provider failed",
            Self::ProviderRateLimited => "Vision provider rate limit exceeded",
            Self::ProviderTimeout => "The vision provider did not respond in time",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether the caller may reasonably retry the whole analysis request.
    ///
    /// Extraction failures are retryable because the provider is
    /// non-deterministic: a fresh call often yields parseable output.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExtractionFailed
                | Self::ProviderError
                | Self::ProviderUnavailable
                | Self::ProviderRateLimited
                | Self::ProviderTimeout
        )
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// User ID if available
    pub user_id: Option<Uuid>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            request_id: None,
            user_id: None,
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Unified error type for the engine
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a request ID to the error context
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.context.request_id = Some(request_id.into());
        self
    }

    /// Add a user ID to the error context
    #[must_use]
    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.context.user_id = Some(user_id);
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an HTTP error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Request ID for correlation, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Structured diagnostic details
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                request_id: error.context.request_id,
                details: error.context.details,
            },
        }
    }
}

/// Maximum length of the raw-text sample attached to extraction errors
const EXTRACTION_SAMPLE_MAX_LEN: usize = 500;

/// Convenience constructors for common errors
impl AppError {
    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Internal engine error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ProviderError,
            format!("{}: {}", provider.into(), message.into()),
        )
    }

    /// Provider call exceeded the configured timeout
    pub fn provider_timeout(provider: impl Into<String>, timeout_secs: u64) -> Self {
        Self::new(
            ErrorCode::ProviderTimeout,
            format!(
                "{} did not respond within {timeout_secs}s",
                provider.into()
            ),
        )
    }

    /// All extraction strategies failed.
    ///
    /// Carries a truncated sample of the raw provider text and each stage's
    /// failure reason for diagnostics. The sample is truncated on a char
    /// boundary so arbitrary provider output never breaks serialization.
    #[must_use]
    pub fn extraction_failed(raw_text: &str, stage_failures: &[(&'static str, String)]) -> Self {
        let sample: String = raw_text.chars().take(EXTRACTION_SAMPLE_MAX_LEN).collect();
        let stages: Vec<serde_json::Value> = stage_failures
            .iter()
            .map(|(stage, reason)| serde_json::json!({ "stage": stage, "reason": reason }))
            .collect();
        Self::new(
            ErrorCode::ExtractionFailed,
            "analysis failed, retry with clearer photos",
        )
        .with_details(serde_json::json!({
            "sample": sample,
            "stages": stages,
        }))
    }
}

/// Conversion from `anyhow::Error` to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.source() {
            Some(source) => Self::new(ErrorCode::InternalError, error.to_string()).with_details(
                serde_json::json!({
                    "source": source.to_string()
                }),
            ),
            None => Self::new(ErrorCode::InternalError, error.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::ExtractionFailed.http_status(), 422);
        assert_eq!(ErrorCode::ProviderError.http_status(), 502);
        assert_eq!(ErrorCode::ProviderTimeout.http_status(), 504);
        assert_eq!(ErrorCode::InternalError.http_status(), 500);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ErrorCode::ProviderError.is_retryable());
        assert!(ErrorCode::ExtractionFailed.is_retryable());
        assert!(!ErrorCode::InvalidInput.is_retryable());
        assert!(!ErrorCode::ConfigMissing.is_retryable());
    }

    #[test]
    fn test_extraction_failed_truncates_sample() {
        let raw = "x".repeat(2000);
        let error = AppError::extraction_failed(&raw, &[("whole_text", "eof".to_owned())]);

        let sample = error.context.details["sample"]
            .as_str()
            .unwrap_or_default();
        assert_eq!(sample.len(), 500);
        assert_eq!(error.context.details["stages"][0]["stage"], "whole_text");
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::provider("openai", "quota exhausted").with_request_id("req-42");
        let response = ErrorResponse::from(error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("PROVIDER_ERROR"));
        assert!(json.contains("req-42"));
    }
}
