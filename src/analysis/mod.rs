// ABOUTME: Core body composition analysis pipeline modules
// ABOUTME: Extraction cascade, schema validation, confidence scoring, signature, orchestration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Analysis Pipeline
//!
//! The body composition core: recover JSON from unreliable provider text,
//! coerce it into a valid record, blend a confidence score, and derive the
//! deterministic body signature. Each stage is independently testable; the
//! orchestrator wires them into one request lifecycle.

pub mod comparison;
pub mod confidence;
pub mod extractor;
pub mod orchestrator;
pub mod signature;
pub mod validator;

pub use comparison::ScanComparison;
pub use confidence::ConfidenceScorer;
pub use extractor::ResponseExtractor;
pub use orchestrator::{AnalysisStage, BodyAnalyzer};
pub use signature::{SignatureEngine, PHI};
pub use validator::{SchemaValidator, ValidatedAnalysis};
