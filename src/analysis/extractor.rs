// ABOUTME: Multi-strategy JSON extraction from unreliable LLM text output
// ABOUTME: Ordered cascade of parse strategies with a textual repair fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Response Extractor
//!
//! Vision providers do not reliably honor "return only JSON" instructions:
//! output arrives as plain JSON, fenced inside a tagged or untagged code
//! block, wrapped in prose, or slightly malformed. This module recovers a
//! structured record through an ordered cascade of strategies, from safest
//! and most precise to most permissive:
//!
//! 1. Whole-text parse
//! 2. Tagged fence parse (```json blocks)
//! 3. Untagged fence parse
//! 4. Brace-span parse (first `{` through last `}`)
//! 5. Repair parse (lead-in stripping, truncation, trailing commas, quote
//!    normalization, bare-key quoting)
//!
//! Each stage runs only if the previous one failed to produce a JSON
//! object. The repair stage trades a small false-positive risk for a much
//! higher successful-extraction rate. Extraction is a pure function of the
//! input text: same text, same result.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Fenced block explicitly tagged as JSON
static TAGGED_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?si)```json\s*(.*?)```").ok());

/// Any fenced block, no tag required
static UNTAGGED_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)```").ok());

/// Conversational lead-in before the payload ("Here is the JSON:" and similar)
static LEAD_IN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:sure[,!.]?\s*)?(?:here(?: is|'s) (?:the |your )?(?:json|analysis|result)[:.]?)\s*")
        .ok()
});

/// Trailing comma before a closing bracket or brace
static TRAILING_COMMA: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").ok());

/// Single-quoted string delimiters
static SINGLE_QUOTED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"'([^'\\]*)'").ok());

/// Bare identifier key; anchored on a preceding `{` or `,` so colons inside
/// string values (URLs, timestamps) survive
static BARE_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#).ok());

/// Parse strategy signature: raw text in, object out or a failure reason
type Strategy = fn(&str) -> Result<Value, String>;

/// The ordered cascade; names appear in extraction-failure diagnostics
const STAGES: &[(&str, Strategy)] = &[
    ("whole_text", parse_whole_text),
    ("tagged_fence", parse_tagged_fence),
    ("untagged_fence", parse_untagged_fence),
    ("brace_span", parse_brace_span),
    ("repair", parse_repaired),
];

/// Recovers a structured record from raw provider text
pub struct ResponseExtractor;

impl ResponseExtractor {
    /// Extract a JSON object from raw provider text.
    ///
    /// Attempts each cascade stage in order, short-circuiting on the first
    /// success. Deterministic: identical text always yields the identical
    /// record or the identical error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::extraction_failed`] when every stage fails,
    /// carrying each stage's failure reason and a truncated text sample.
    pub fn extract(raw_text: &str) -> Result<Value, AppError> {
        let mut failures: Vec<(&'static str, String)> = Vec::with_capacity(STAGES.len());

        for &(name, strategy) in STAGES {
            match strategy(raw_text) {
                Ok(value) => {
                    debug!(stage = name, "Extracted structured data");
                    return Ok(value);
                }
                Err(reason) => failures.push((name, reason)),
            }
        }

        warn!(
            stages = failures.len(),
            "All extraction strategies exhausted"
        );
        Err(AppError::extraction_failed(raw_text, &failures))
    }
}

/// Parse a candidate string, requiring a top-level JSON object
fn parse_object(candidate: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(candidate).map_err(|e| e.to_string())?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("parsed value is not an object".to_owned())
    }
}

/// Stage 1: trim and parse the entire text
fn parse_whole_text(text: &str) -> Result<Value, String> {
    parse_object(text.trim())
}

/// Stage 2: parse the interior of a ```json fenced block
fn parse_tagged_fence(text: &str) -> Result<Value, String> {
    let regex = TAGGED_FENCE
        .as_ref()
        .ok_or_else(|| "fence pattern unavailable".to_owned())?;
    let interior = regex
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or_else(|| "no tagged fence found".to_owned())?;
    parse_object(interior.as_str().trim())
}

/// Stage 3: parse the interior of any fenced block
fn parse_untagged_fence(text: &str) -> Result<Value, String> {
    let regex = UNTAGGED_FENCE
        .as_ref()
        .ok_or_else(|| "fence pattern unavailable".to_owned())?;
    let interior = regex
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or_else(|| "no fenced block found".to_owned())?;
    parse_object(interior.as_str().trim())
}

/// Locate the first `{` .. last `}` span, inclusive
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Stage 4: parse the first-to-last brace span
fn parse_brace_span(text: &str) -> Result<Value, String> {
    let span = brace_span(text).ok_or_else(|| "no brace span found".to_owned())?;
    parse_object(span)
}

/// Stage 5: apply the textual repair sequence, then parse.
///
/// Best-effort heuristics tuned for realistic near-miss provider output,
/// not adversarial input.
fn parse_repaired(text: &str) -> Result<Value, String> {
    let mut candidate = text.trim().to_owned();

    if let Some(regex) = LEAD_IN.as_ref() {
        candidate = regex.replace(&candidate, "").into_owned();
    }

    // Narrow to the brace span; this also truncates anything after the
    // last closing brace
    if let Some(span) = brace_span(&candidate) {
        candidate = span.to_owned();
    }

    if let Some(regex) = TRAILING_COMMA.as_ref() {
        candidate = regex.replace_all(&candidate, "$1").into_owned();
    }
    if let Some(regex) = SINGLE_QUOTED.as_ref() {
        candidate = regex.replace_all(&candidate, "\"$1\"").into_owned();
    }
    if let Some(regex) = BARE_KEY.as_ref() {
        candidate = regex.replace_all(&candidate, "$1\"$2\":").into_owned();
    }

    parse_object(&candidate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_text_parse() {
        let value = ResponseExtractor::extract(r#"  {"bodyFatPercentage": 15.5}  "#).unwrap();
        assert_eq!(value["bodyFatPercentage"], 15.5);
    }

    #[test]
    fn test_tagged_fence_parse() {
        let text = "Model output below.\n```json\n{\"physiqueRating\": 7}\n```\nDone.";
        let value = ResponseExtractor::extract(text).unwrap();
        assert_eq!(value["physiqueRating"], 7);
    }

    #[test]
    fn test_untagged_fence_parse() {
        let text = "```\n{\"confidence\": 0.8}\n```";
        let value = ResponseExtractor::extract(text).unwrap();
        assert_eq!(value["confidence"], 0.8);
    }

    #[test]
    fn test_brace_span_parse() {
        let text = "Your analysis: {\"fitnessLevel\": \"advanced\"} - good luck!";
        let value = ResponseExtractor::extract(text).unwrap();
        assert_eq!(value["fitnessLevel"], "advanced");
    }

    #[test]
    fn test_repair_strips_lead_in_and_trailing_comma() {
        let text = "Here is the JSON:\n{\"bodyFatPercentage\": 15.5, \"physiqueRating\": 7,}\nHope that helps!";
        let value = ResponseExtractor::extract(text).unwrap();
        assert_eq!(value["bodyFatPercentage"], 15.5);
        assert_eq!(value["physiqueRating"], 7);
    }

    #[test]
    fn test_repair_normalizes_quotes_and_bare_keys() {
        let text = "{muscleMassLevel: 'high', notes: 'solid base'}";
        let value = ResponseExtractor::extract(text).unwrap();
        assert_eq!(value["muscleMassLevel"], "high");
        assert_eq!(value["notes"], "solid base");
    }

    #[test]
    fn test_repair_preserves_colons_in_string_values() {
        let text = r#"{"notes": "see https://example.com/guide", "physiqueRating": 6,}"#;
        let value = ResponseExtractor::extract(text).unwrap();
        assert_eq!(value["notes"], "see https://example.com/guide");
    }

    #[test]
    fn test_all_stages_fail_carries_diagnostics() {
        let err = ResponseExtractor::extract("no structured data here at all").unwrap_err();
        let stages = err.context.details["stages"].as_array().unwrap();
        assert_eq!(stages.len(), 5);
        assert_eq!(stages[0]["stage"], "whole_text");
        assert_eq!(stages[4]["stage"], "repair");
        assert!(err.context.details["sample"]
            .as_str()
            .unwrap()
            .contains("no structured data"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "prefix {\"waistCm\": 82} suffix";
        let first = ResponseExtractor::extract(text).unwrap();
        let second = ResponseExtractor::extract(text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_object_json_rejected_by_early_stages() {
        // A bare number parses as JSON but is not a record; the cascade
        // must keep going and ultimately fail
        let err = ResponseExtractor::extract("42").unwrap_err();
        let stages = err.context.details["stages"].as_array().unwrap();
        assert_eq!(stages[0]["reason"], "parsed value is not an object");
    }
}
