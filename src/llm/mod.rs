// ABOUTME: Vision provider abstraction layer for pluggable AI model integration
// ABOUTME: Defines the contract for vision-capable LLM providers and the RAG context collaborator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Vision Provider Service Provider Interface
//!
//! This module defines the contract a vision-capable text generator must
//! implement to back the body analysis pipeline. The provider is treated as
//! an opaque function from prompt + images to raw text: non-deterministic,
//! variable-latency, and fallible. Nothing downstream assumes the provider
//! honored the prompt's format instructions; that is what the extraction
//! cascade and schema validator exist for.
//!
//! ## Key Concepts
//!
//! - **`VisionCapabilities`**: Bitflags describing provider features
//! - **`VisionProvider`**: Async trait for image-grounded text generation
//! - **`ContextProvider`**: Opaque knowledge-context collaborator injected
//!   into the orchestrator instead of a module-level singleton

mod gemini;
mod openai;
pub mod prompts;
mod provider;

pub use gemini::GeminiVisionProvider;
pub use openai::OpenAiVisionProvider;
pub use provider::VisionClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::ImageData;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// Vision provider capability flags using bitflags for efficient storage
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct VisionCapabilities: u8 {
        /// Provider accepts image input
        const VISION = 0b0000_0001;
        /// Provider supports JSON mode output
        const JSON_MODE = 0b0000_0010;
        /// Provider supports system messages
        const SYSTEM_MESSAGES = 0b0000_0100;
    }
}

impl VisionCapabilities {
    /// Capabilities required to back the body analysis pipeline
    #[must_use]
    pub const fn vision_required() -> Self {
        Self::VISION
    }

    /// Check if image input is supported
    #[must_use]
    pub const fn supports_vision(&self) -> bool {
        self.contains(Self::VISION)
    }

    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Vision-capable text generation provider.
///
/// Implement this trait to add a new vision backend. The contract is
/// deliberately narrow: one prompt, one to three images, one raw text blob
/// back. Latency is unbounded; the orchestrator wraps calls in its
/// configured timeout.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Unique provider identifier (e.g., "openai", "gemini")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> VisionCapabilities;

    /// Default model to use if not overridden
    fn default_model(&self) -> &str;

    /// Available models for this provider
    fn available_models(&self) -> &'static [&'static str];

    /// Generate raw analysis text from a prompt and photo set.
    ///
    /// The returned text is whatever the model produced. Identical inputs
    /// may yield different output across calls.
    ///
    /// # Errors
    ///
    /// Returns `AppError` with a provider error code on network, auth,
    /// quota, or API failure.
    async fn analyze_images(&self, prompt: &str, images: &[ImageData])
        -> Result<String, AppError>;

    /// Check if the provider is reachable and the API key is valid
    async fn health_check(&self) -> Result<bool, AppError>;
}

// ============================================================================
// Knowledge Context Collaborator
// ============================================================================

/// Opaque knowledge-context provider (the RAG collaborator).
///
/// Supplies domain text to enrich the analysis prompt. The engine treats it
/// as a black box; retrieval mechanics live outside the core.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Retrieve relevant context text for a query, or None when the
    /// knowledge base has nothing useful.
    async fn relevant_context(&self, query: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_capabilities() {
        assert!(VisionCapabilities::vision_required().supports_vision());
        assert!(!VisionCapabilities::empty().supports_vision());
    }

    #[test]
    fn test_capability_composition() {
        let caps = VisionCapabilities::VISION | VisionCapabilities::JSON_MODE;
        assert!(caps.supports_vision());
        assert!(caps.supports_json_mode());
    }
}
