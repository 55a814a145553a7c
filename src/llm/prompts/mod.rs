// ABOUTME: Prompt construction for body composition analysis requests
// ABOUTME: Builds photo-count-aware prompts embedding the exact target JSON shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Analysis Prompts
//!
//! Builds the prompt sent to the vision provider. The wording varies with
//! photo count (single photo vs front/side/back set) but only in the
//! narrative guidance; the embedded JSON contract is always identical, and
//! it is the shape the extraction cascade and schema validator are built
//! against. The format instruction is advisory: providers routinely ignore
//! it, which is precisely why the extractor exists.

use std::fmt::Write as _;

/// System role preamble, loaded at compile time
pub const BODY_SYSTEM_PROMPT: &str = include_str!("body_system.md");

/// The exact JSON shape the provider is asked to return
const RESPONSE_SHAPE: &str = r#"{
  "bodyFatPercentage": 15.5,
  "muscleMassLevel": "moderate",
  "physiqueRating": 7,
  "measurements": {
    "chestCm": 102,
    "waistCm": 82,
    "hipsCm": 98,
    "bicepCm": 36,
    "thighCm": 58,
    "shoulderWidthCm": 45,
    "neckCm": 38,
    "calfCm": 38,
    "forearmCm": 28,
    "heightCm": 175
  },
  "posture": {
    "quality": "good",
    "notes": "Slight forward shoulder rotation, good spinal alignment"
  },
  "fitnessLevel": "intermediate",
  "muscleDevelopment": {
    "chest": "moderate",
    "back": "good",
    "shoulders": "moderate",
    "arms": "moderate",
    "core": "good",
    "legs": "good"
  },
  "recommendations": {
    "focusAreas": ["chest", "shoulders"],
    "workoutSplit": "Push/Pull/Legs 5-6x per week",
    "nutritionTips": "Maintain slight caloric surplus for muscle gain, aim for 1.6g protein per kg bodyweight",
    "progressGoals": "Gain 2-3kg lean muscle in 3 months, maintain or slightly reduce body fat"
  },
  "confidence": 0.75,
  "notes": "Based on visible muscle definition and body composition. For most accurate results, use DEXA scan or professional body composition analysis."
}"#;

/// Get the system prompt for body analysis requests
#[must_use]
pub const fn get_body_system_prompt() -> &'static str {
    BODY_SYSTEM_PROMPT
}

/// Build the body analysis prompt for a given photo count.
///
/// With multiple photos the prompt asks the model to reconcile angles and
/// avoid double counting; with one photo it asks for single-view estimates.
/// Optional knowledge context from the RAG collaborator is appended as a
/// reference block. Only the narrative prose varies; the numeric contract
/// (the JSON shape) is constant.
#[must_use]
pub fn body_analysis_prompt(photo_count: usize, knowledge_context: Option<&str>) -> String {
    let mut prompt = String::with_capacity(RESPONSE_SHAPE.len() + 1024);

    if photo_count > 1 {
        let _ = write!(
            prompt,
            "Analyze ALL {photo_count} body photos. These may show different angles \
             (front, side, back) of the same person.\n\n\
             IMPORTANT INSTRUCTIONS:\n\
             - Look across ALL photos to get a comprehensive view\n\
             - Use different angles to improve accuracy, avoid double counting across angles\n\
             - Front view: overall physique, symmetry\n\
             - Side view: posture, core development\n\
             - Back view: back muscles, posterior chain\n"
        );
    } else {
        prompt.push_str(
            "Analyze this body photo and provide detailed body composition estimates.\n\n\
             IMPORTANT INSTRUCTIONS:\n\
             - Analyze visible muscle definition and body composition\n\
             - Estimate based on visible physique markers\n",
        );
    }

    let photos_word = if photo_count > 1 { "photos" } else { "photo" };
    let _ = write!(
        prompt,
        "\nBased on the {photos_word}, provide detailed estimates for:\n\n\
         1. Body composition: body fat percentage, muscle mass level (low/moderate/high), \
         overall physique rating (1-10)\n\
         2. Measurements in cm: chest, waist, hips, bicep (relaxed), thigh, shoulder width, \
         neck, calf, forearm, height\n\
         3. Posture and form: quality (good/fair/needs improvement), notable imbalances\n\
         4. Fitness assessment: level (beginner/intermediate/advanced), per-group muscle \
         development (low/moderate/good/excellent)\n\
         5. Progress potential: focus areas and goals for the next 3 months\n"
    );

    if let Some(context) = knowledge_context {
        if !context.is_empty() {
            let _ = write!(
                prompt,
                "\nRelevant coaching knowledge for reference:\n{context}\n"
            );
        }
    }

    let _ = write!(
        prompt,
        "\nCRITICAL: Return your analysis as valid JSON in this EXACT format \
         (no markdown, no code blocks):\n{RESPONSE_SHAPE}"
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_photo_wording() {
        let prompt = body_analysis_prompt(1, None);
        assert!(prompt.contains("Analyze this body photo"));
        assert!(!prompt.contains("ALL"));
    }

    #[test]
    fn test_multi_photo_wording() {
        let prompt = body_analysis_prompt(3, None);
        assert!(prompt.contains("Analyze ALL 3 body photos"));
        assert!(prompt.contains("avoid double counting"));
    }

    #[test]
    fn test_json_contract_always_present() {
        for count in 1..=3 {
            let prompt = body_analysis_prompt(count, None);
            assert!(prompt.contains("\"bodyFatPercentage\""));
            assert!(prompt.contains("\"shoulderWidthCm\""));
            assert!(prompt.contains("no markdown, no code blocks"));
        }
    }

    #[test]
    fn test_knowledge_context_appended() {
        let prompt = body_analysis_prompt(2, Some("Protein intake guidance..."));
        assert!(prompt.contains("Protein intake guidance"));

        let without = body_analysis_prompt(2, Some(""));
        assert!(!without.contains("coaching knowledge"));
    }
}
