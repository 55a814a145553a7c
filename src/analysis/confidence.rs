// ABOUTME: Four-factor confidence scoring for validated body analyses
// ABOUTME: Blends photo coverage, anatomical consistency, completeness and provider confidence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Confidence Scorer
//!
//! Replaces the provider's self-reported confidence with a blended score the
//! engine can stand behind. Four independent factors are combined with fixed
//! weights and the result is clamped so a stored analysis is never presented
//! as either worthless or certain.
//!
//! Completeness is measured against the raw extracted record, before the
//! schema validator substitutes defaults. A provider that omitted half the
//! schema should not score as complete just because the validator papered
//! over the gaps.

use serde_json::Value;
use tracing::debug;

use crate::models::{BodyAnalysisRecord, BodyMeasurements};

/// Weight of the photo coverage factor
pub const PHOTO_WEIGHT: f64 = 0.35;
/// Weight of the anatomical consistency factor
pub const CONSISTENCY_WEIGHT: f64 = 0.25;
/// Weight of the schema completeness factor
pub const COMPLETENESS_WEIGHT: f64 = 0.20;
/// Weight of the provider's self-reported confidence
pub const PROVIDER_WEIGHT: f64 = 0.20;

/// Lower clamp on the blended score
pub const MIN_CONFIDENCE: f64 = 0.4;
/// Upper clamp on the blended score
pub const MAX_CONFIDENCE: f64 = 0.99;

/// Top-level keys counted toward completeness, alongside the ten measurements
const COMPLETENESS_TOP_LEVEL: [&str; 6] = [
    "bodyFatPercentage",
    "muscleMassLevel",
    "physiqueRating",
    "fitnessLevel",
    "muscleDevelopment",
    "recommendations",
];

/// Measurement keys counted toward completeness
const COMPLETENESS_MEASUREMENTS: [&str; 10] = [
    "chestCm",
    "waistCm",
    "hipsCm",
    "bicepCm",
    "thighCm",
    "shoulderWidthCm",
    "neckCm",
    "calfCm",
    "forearmCm",
    "heightCm",
];

/// Blends the four confidence factors into a single score
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    /// Compute the blended confidence for a validated record.
    ///
    /// `raw` is the extracted record before validation; `record` is the
    /// validated result. The returned score is always within
    /// [`MIN_CONFIDENCE`], [`MAX_CONFIDENCE`].
    #[must_use]
    pub fn score(record: &BodyAnalysisRecord, raw: &Value, photo_count: usize) -> f64 {
        let photo = Self::photo_factor(photo_count);
        let consistency = Self::consistency_factor(&record.measurements);
        let completeness = Self::completeness_factor(raw);
        let provider = record.confidence;

        let blended = PHOTO_WEIGHT * photo
            + CONSISTENCY_WEIGHT * consistency
            + COMPLETENESS_WEIGHT * completeness
            + PROVIDER_WEIGHT * provider;
        let clamped = blended.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

        debug!(
            photo,
            consistency, completeness, provider, confidence = clamped,
            "Computed blended confidence"
        );

        clamped
    }

    /// Coverage factor from the number of photos analyzed
    #[must_use]
    pub fn photo_factor(photo_count: usize) -> f64 {
        match photo_count {
            0 | 1 => 0.65,
            2 => 0.85,
            _ => 1.0,
        }
    }

    /// Anatomical consistency factor.
    ///
    /// Starts at 1.0 and deducts a fixed penalty per implausible relation
    /// between validated measurements, with a floor of 0.5. Each relation is
    /// checked independently so one anomaly cannot mask another.
    #[must_use]
    pub fn consistency_factor(m: &BodyMeasurements) -> f64 {
        let mut factor: f64 = 1.0;

        if m.shoulder_width_cm > m.chest_cm {
            factor -= 0.10;
        }
        if m.chest_cm < m.waist_cm {
            factor -= 0.15;
        }
        let waist_to_hip = m.waist_cm / m.hips_cm;
        if !(0.7..=1.1).contains(&waist_to_hip) {
            factor -= 0.10;
        }
        if m.thigh_cm <= m.calf_cm {
            factor -= 0.10;
        }
        if m.bicep_cm <= m.forearm_cm {
            factor -= 0.10;
        }

        factor.max(0.5)
    }

    /// Fraction of the sixteen expected keys the provider actually supplied
    /// with the right JSON type, measured before validation
    #[must_use]
    pub fn completeness_factor(raw: &Value) -> f64 {
        let mut present = 0_usize;

        for key in COMPLETENESS_TOP_LEVEL {
            let ok = match key {
                "bodyFatPercentage" | "physiqueRating" => {
                    raw.get(key).is_some_and(Value::is_number)
                }
                "muscleMassLevel" | "fitnessLevel" => raw.get(key).is_some_and(Value::is_string),
                _ => raw.get(key).is_some_and(Value::is_object),
            };
            if ok {
                present += 1;
            }
        }

        let measurements = raw.get("measurements");
        for key in COMPLETENESS_MEASUREMENTS {
            if measurements
                .and_then(|m| m.get(key))
                .is_some_and(Value::is_number)
            {
                present += 1;
            }
        }

        let total = COMPLETENESS_TOP_LEVEL.len() + COMPLETENESS_MEASUREMENTS.len();
        present as f64 / total as f64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analysis::validator::SchemaValidator;
    use serde_json::json;

    fn full_raw() -> Value {
        json!({
            "bodyFatPercentage": 15.0,
            "muscleMassLevel": "high",
            "physiqueRating": 8,
            "fitnessLevel": "advanced",
            "muscleDevelopment": {
                "chest": "good", "back": "good", "shoulders": "excellent",
                "arms": "good", "core": "moderate", "legs": "good"
            },
            "recommendations": {
                "focusAreas": ["legs"],
                "workoutSplit": "PPL",
                "nutritionTips": "lean bulk",
                "progressGoals": "add 2kg lean mass"
            },
            "measurements": {
                "chestCm": 105.0, "waistCm": 80.0, "hipsCm": 95.0,
                "bicepCm": 38.0, "thighCm": 60.0, "shoulderWidthCm": 50.0,
                "neckCm": 39.0, "calfCm": 38.0, "forearmCm": 30.0,
                "heightCm": 180.0
            },
            "confidence": 0.9
        })
    }

    #[test]
    fn test_complete_consistent_record_scores_high() {
        let raw = full_raw();
        let record = SchemaValidator::validate(&raw).record;
        let score = ConfidenceScorer::score(&record, &raw, 3);

        // 0.35*1.0 + 0.25*1.0 + 0.20*1.0 + 0.20*0.9 = 0.98
        assert!((score - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_photo_factor_tiers() {
        assert!((ConfidenceScorer::photo_factor(0) - 0.65).abs() < f64::EPSILON);
        assert!((ConfidenceScorer::photo_factor(1) - 0.65).abs() < f64::EPSILON);
        assert!((ConfidenceScorer::photo_factor(2) - 0.85).abs() < f64::EPSILON);
        assert!((ConfidenceScorer::photo_factor(3) - 1.0).abs() < f64::EPSILON);
        assert!((ConfidenceScorer::photo_factor(7) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_consistency_penalties_are_independent() {
        let mut raw = full_raw();
        // chest below waist and thigh below calf at once
        raw["measurements"]["chestCm"] = json!(75.0);
        raw["measurements"]["waistCm"] = json!(80.0);
        raw["measurements"]["thighCm"] = json!(36.0);
        let record = SchemaValidator::validate(&raw).record;

        let factor = ConfidenceScorer::consistency_factor(&record.measurements);
        assert!((factor - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_floor() {
        // all five penalties trip (deducting to 0.45); the floor holds at 0.5
        let m = BodyMeasurements {
            chest_cm: 75.0,
            waist_cm: 120.0,
            hips_cm: 70.0,
            bicep_cm: 21.0,
            thigh_cm: 36.0,
            shoulder_width_cm: 80.0,
            neck_cm: 38.0,
            calf_cm: 44.0,
            forearm_cm: 28.0,
            height_cm: 175.0,
        };

        let factor = ConfidenceScorer::consistency_factor(&m);
        assert!((factor - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_consistency_of_validated_measurements_bottoms_above_floor() {
        // in-range shoulder width (max 60) never exceeds in-range chest
        // girth (min 70), so validated measurements trip at most four
        // penalties and never hit the floor
        let record = SchemaValidator::validate(&json!({
            "measurements": {
                "chestCm": 70.0, "waistCm": 128.0, "hipsCm": 70.0,
                "bicepCm": 20.0, "thighCm": 35.0, "shoulderWidthCm": 59.0,
                "neckCm": 38.0, "calfCm": 44.0, "forearmCm": 28.0,
                "heightCm": 175.0
            }
        }))
        .record;

        let factor = ConfidenceScorer::consistency_factor(&record.measurements);
        assert!((factor - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_completeness_measured_before_validation() {
        let raw = json!({"bodyFatPercentage": 18.0});
        let record = SchemaValidator::validate(&raw).record;

        // validator filled every default, yet only 1 of 16 keys was supplied
        let completeness = ConfidenceScorer::completeness_factor(&raw);
        assert!((completeness - 1.0 / 16.0).abs() < 1e-9);

        let score = ConfidenceScorer::score(&record, &raw, 1);
        assert!(score < 0.7);
    }

    #[test]
    fn test_score_clamped_to_floor() {
        let raw = json!({});
        let mut record = SchemaValidator::validate(&raw).record;
        record.confidence = 0.0;
        record.measurements.chest_cm = 75.0;
        record.measurements.waist_cm = 120.0;
        record.measurements.thigh_cm = 36.0;
        record.measurements.calf_cm = 44.0;
        record.measurements.bicep_cm = 21.0;
        record.measurements.forearm_cm = 28.0;
        record.measurements.shoulder_width_cm = 80.0;

        let score = ConfidenceScorer::score(&record, &raw, 0);
        assert!((score - MIN_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_never_reaches_one() {
        let raw = full_raw();
        let mut record = SchemaValidator::validate(&raw).record;
        record.confidence = 1.0;

        let score = ConfidenceScorer::score(&record, &raw, 3);
        assert!(score <= MAX_CONFIDENCE);
    }
}
