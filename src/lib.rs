// ABOUTME: Main library entry point for the ReddyFit body composition engine
// ABOUTME: Provides JSON extraction, validation, confidence scoring and body signatures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

#![deny(unsafe_code)]

//! # ReddyFit Body Composition Engine
//!
//! Analyzes body photos through vision-capable LLM providers and turns their
//! unreliable free-text output into validated, scored, fingerprinted body
//! composition records.
//!
//! ## Features
//!
//! - **Resilient extraction**: a five-strategy cascade recovers JSON from
//!   prose-wrapped, fenced, or lightly malformed provider responses
//! - **Total validation**: every extracted field is coerced into an
//!   anatomically plausible range; validation never fails
//! - **Blended confidence**: photo coverage, anatomical consistency, schema
//!   completeness, and provider self-assessment combined with fixed weights
//! - **Body signatures**: deterministic ratio metrics, classification, and a
//!   reproducible fingerprint for identity and progress comparison
//! - **Multi-provider support**: `OpenAI` and Gemini vision backends behind
//!   one trait, selected via environment configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reddyfit_engine::analysis::BodyAnalyzer;
//! use reddyfit_engine::llm::VisionClient;
//! use reddyfit_engine::models::ImageData;
//!
//! # async fn run() -> Result<(), reddyfit_engine::errors::AppError> {
//! let provider = Arc::new(VisionClient::from_env()?);
//! let analyzer = BodyAnalyzer::new(provider);
//!
//! let photos = vec![ImageData::jpeg("...base64...")];
//! let result = analyzer.analyze(&photos).await?;
//! println!("{}", result.body_signature.unique_id);
//! # Ok(())
//! # }
//! ```

/// Extraction, validation, scoring, signature, and orchestration pipeline
pub mod analysis;

/// Environment-based provider selection and engine limits
pub mod config;

/// Error types and HTTP status mapping
pub mod errors;

/// Vision provider trait, concrete backends, and prompt construction
pub mod llm;

/// Structured logging initialization
pub mod logging;

/// Core data structures for analyses and signatures
pub mod models;
