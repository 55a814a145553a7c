// ABOUTME: Body analysis orchestrator sequencing provider call through signature derivation
// ABOUTME: Owns the request lifecycle, stage tracking, timeout and error surfacing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Body Analysis Orchestrator
//!
//! Sequences one analysis request end to end: prompt the vision provider,
//! extract JSON from whatever came back, validate it, score confidence, and
//! derive the body signature. The pipeline can fail only while requesting or
//! extracting; once a record is extracted, validation, scoring, and signing
//! are total and the full result is guaranteed.
//!
//! Collaborators are constructor-injected. The provider is the only
//! suspension point and runs under the configured timeout; everything after
//! it is synchronous and fast.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::analysis::confidence::ConfidenceScorer;
use crate::analysis::extractor::ResponseExtractor;
use crate::analysis::signature::SignatureEngine;
use crate::analysis::validator::{SchemaValidator, ValidatedAnalysis};
use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::llm::prompts::body_analysis_prompt;
use crate::llm::{ContextProvider, VisionProvider};
use crate::models::{BodyScanResult, ImageData};

/// Query sent to the knowledge context provider before prompting
const CONTEXT_QUERY: &str = "body composition assessment and physique measurement guidance";

/// Pipeline stage of one analysis request.
///
/// Failure is reachable from `Requesting` and `Extracting` only; the later
/// stages are total by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    /// Awaiting the vision provider response
    Requesting,
    /// Recovering structured JSON from the raw response text
    Extracting,
    /// Coercing the extracted record into a valid analysis
    Validating,
    /// Blending the confidence factors
    Scoring,
    /// Deriving the body signature
    SigningOff,
    /// Result produced
    Done,
    /// Provider call or extraction failed
    Failed,
}

impl AnalysisStage {
    /// Stage name for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requesting => "requesting",
            Self::Extracting => "extracting",
            Self::Validating => "validating",
            Self::Scoring => "scoring",
            Self::SigningOff => "signing_off",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the full analysis pipeline for submitted photos
pub struct BodyAnalyzer {
    provider: Arc<dyn VisionProvider>,
    context_provider: Option<Arc<dyn ContextProvider>>,
    config: EngineConfig,
}

impl BodyAnalyzer {
    /// Create an analyzer over a vision provider with default configuration
    #[must_use]
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self {
            provider,
            context_provider: None,
            config: EngineConfig::default(),
        }
    }

    /// Override the engine configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a knowledge context provider whose retrieved guidance is
    /// appended to the analysis prompt
    #[must_use]
    pub fn with_context_provider(mut self, context_provider: Arc<dyn ContextProvider>) -> Self {
        self.context_provider = Some(context_provider);
        self
    }

    /// Analyze 1 to `max_images` body photos into a validated record with
    /// its attached signature.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the photo count is out of range or the
    /// provider lacks vision support, a provider error when the external
    /// call fails or times out, and `ExtractionFailed` when no extraction
    /// strategy recovers a JSON object from the response.
    #[instrument(skip_all, fields(provider = self.provider.name(), photos = images.len()))]
    pub async fn analyze(&self, images: &[ImageData]) -> Result<BodyScanResult, AppError> {
        if images.is_empty() {
            return Err(AppError::invalid_input(
                "At least one body photo is required",
            ));
        }
        if images.len() > self.config.max_images {
            return Err(AppError::invalid_input(format!(
                "At most {} body photos are accepted per analysis, got {}",
                self.config.max_images,
                images.len()
            )));
        }
        if !self.provider.capabilities().supports_vision() {
            return Err(AppError::invalid_input(format!(
                "Provider {} does not support image analysis",
                self.provider.name()
            )));
        }

        let request_id = Uuid::new_v4().to_string();

        let knowledge = match &self.context_provider {
            Some(context) => context.relevant_context(CONTEXT_QUERY).await,
            None => None,
        };
        let prompt = body_analysis_prompt(images.len(), knowledge.as_deref());

        debug!(request_id, stage = %AnalysisStage::Requesting, "Calling vision provider");
        let raw_text = match timeout(
            Duration::from_secs(self.config.provider_timeout_secs),
            self.provider.analyze_images(&prompt, images),
        )
        .await
        {
            Err(_) => {
                warn!(request_id, stage = %AnalysisStage::Failed, "Provider call timed out");
                return Err(AppError::provider_timeout(
                    self.provider.name(),
                    self.config.provider_timeout_secs,
                )
                .with_request_id(&request_id));
            }
            Ok(Err(e)) => {
                warn!(request_id, stage = %AnalysisStage::Failed, "Provider call failed");
                return Err(e.with_request_id(&request_id));
            }
            Ok(Ok(text)) => text,
        };

        debug!(
            request_id,
            stage = %AnalysisStage::Extracting,
            response_len = raw_text.len(),
            "Extracting structured record"
        );
        let raw_record = ResponseExtractor::extract(&raw_text).map_err(|e| {
            warn!(request_id, stage = %AnalysisStage::Failed, "No extraction strategy succeeded");
            e.with_request_id(&request_id)
        })?;

        // no failure paths from here on
        debug!(request_id, stage = %AnalysisStage::Validating, "Validating extracted record");
        let ValidatedAnalysis {
            mut record,
            corrections,
        } = SchemaValidator::validate(&raw_record);

        debug!(request_id, stage = %AnalysisStage::Scoring, "Scoring confidence");
        record.confidence = ConfidenceScorer::score(&record, &raw_record, images.len());

        debug!(request_id, stage = %AnalysisStage::SigningOff, "Deriving body signature");
        let body_signature = SignatureEngine::compute(&record);

        info!(
            request_id,
            stage = %AnalysisStage::Done,
            body_type = %body_signature.body_type_classification,
            confidence = record.confidence,
            corrected_fields = corrections.len(),
            "Body analysis complete"
        );

        Ok(BodyScanResult {
            analysis: record,
            body_signature,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(AnalysisStage::Requesting.as_str(), "requesting");
        assert_eq!(AnalysisStage::SigningOff.to_string(), "signing_off");
        assert_ne!(AnalysisStage::Done, AnalysisStage::Failed);
    }
}
