// ABOUTME: Schema validation and sanitization for extracted analysis records
// ABOUTME: Coerces untrusted provider output into in-range BodyAnalysisRecord values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Schema Validator
//!
//! Coerces a freshly extracted, untrusted JSON tree into a fully valid
//! [`BodyAnalysisRecord`]. Validation is total: every field is checked
//! independently, and any absent, mistyped, or out-of-range value is
//! replaced with its documented default. The list of corrected fields is
//! returned for observability; correcting one field never affects another.
//!
//! Downstream consumers (confidence scorer, signature engine) rely on the
//! output being in range unconditionally and do not re-validate.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::models::{
    BodyAnalysisRecord, BodyMeasurements, DevelopmentLevel, FitnessLevel, MuscleDevelopment,
    MuscleMassLevel, PostureAssessment, PostureQuality, Recommendations,
};

/// Valid range and default for one numeric field
#[derive(Debug, Clone, Copy)]
pub struct NumericRange {
    /// Inclusive minimum
    pub min: f64,
    /// Inclusive maximum
    pub max: f64,
    /// Substituted when the value is absent, mistyped, or out of range
    pub default: f64,
}

impl NumericRange {
    const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    /// Whether a value is acceptable for this field
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Anatomically plausible range for body fat percentage
pub const BODY_FAT_RANGE: NumericRange = NumericRange::new(5.0, 50.0, 20.0);

/// Valid range for the self-reported provider confidence
pub const CONFIDENCE_RANGE: NumericRange = NumericRange::new(0.0, 1.0, 0.75);

/// Anatomically plausible ranges for the ten measurements, in centimeters.
/// Defaults sit at the midpoint of each range.
pub const MEASUREMENT_RANGES: [(&str, NumericRange); 10] = [
    ("chestCm", NumericRange::new(70.0, 140.0, 100.0)),
    ("waistCm", NumericRange::new(60.0, 130.0, 85.0)),
    ("hipsCm", NumericRange::new(70.0, 140.0, 95.0)),
    ("bicepCm", NumericRange::new(20.0, 50.0, 35.0)),
    ("thighCm", NumericRange::new(35.0, 80.0, 55.0)),
    ("shoulderWidthCm", NumericRange::new(35.0, 60.0, 45.0)),
    ("neckCm", NumericRange::new(28.0, 50.0, 38.0)),
    ("calfCm", NumericRange::new(25.0, 50.0, 38.0)),
    ("forearmCm", NumericRange::new(20.0, 40.0, 28.0)),
    ("heightCm", NumericRange::new(140.0, 220.0, 175.0)),
];

/// Default posture notes when the provider supplied none
const DEFAULT_POSTURE_NOTES: &str = "Normal posture";

/// Default free-form notes when the provider supplied none
const DEFAULT_NOTES: &str = "Analysis based on visible physique markers.";

/// A validated record together with the fields that had to be corrected
#[derive(Debug, Clone)]
pub struct ValidatedAnalysis {
    /// The fully populated, in-range record
    pub record: BodyAnalysisRecord,
    /// Dotted paths of fields that were replaced with defaults.
    /// Observability only; never used for control flow.
    pub corrections: Vec<String>,
}

/// Coerces untrusted extracted records into valid analyses
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate and sanitize an extracted record.
    ///
    /// Never fails: always returns a fully populated record where every
    /// numeric field is within its documented range and every enum field
    /// is a recognized variant. Idempotent: validating an already-valid
    /// record changes nothing.
    #[must_use]
    pub fn validate(raw: &Value) -> ValidatedAnalysis {
        let mut corrections = Vec::new();

        let record = BodyAnalysisRecord {
            body_fat_percentage: numeric_field(
                raw.get("bodyFatPercentage"),
                BODY_FAT_RANGE,
                "bodyFatPercentage",
                &mut corrections,
            ),
            muscle_mass_level: enum_field(
                raw.get("muscleMassLevel"),
                MuscleMassLevel::Moderate,
                "muscleMassLevel",
                &mut corrections,
            ),
            physique_rating: rating_field(raw.get("physiqueRating"), &mut corrections),
            measurements: measurements_field(raw.get("measurements"), &mut corrections),
            posture: posture_field(raw.get("posture"), &mut corrections),
            fitness_level: enum_field(
                raw.get("fitnessLevel"),
                FitnessLevel::Intermediate,
                "fitnessLevel",
                &mut corrections,
            ),
            muscle_development: muscle_development_field(
                raw.get("muscleDevelopment"),
                &mut corrections,
            ),
            recommendations: recommendations_field(raw.get("recommendations"), &mut corrections),
            confidence: numeric_field(
                raw.get("confidence"),
                CONFIDENCE_RANGE,
                "confidence",
                &mut corrections,
            ),
            notes: string_field(raw.get("notes"), DEFAULT_NOTES, "notes", &mut corrections),
        };

        if !corrections.is_empty() {
            warn!(
                corrected = corrections.len(),
                fields = ?corrections,
                "Replaced invalid or missing fields with defaults"
            );
        }

        ValidatedAnalysis {
            record,
            corrections,
        }
    }
}

/// Coerce a numeric field into its valid range
fn numeric_field(
    value: Option<&Value>,
    range: NumericRange,
    field: &str,
    corrections: &mut Vec<String>,
) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(v) if range.contains(v) => v,
        _ => {
            corrections.push(field.to_owned());
            range.default
        }
    }
}

/// Coerce the physique rating into an integer in [1, 10]
fn rating_field(value: Option<&Value>, corrections: &mut Vec<String>) -> u8 {
    match value.and_then(Value::as_u64) {
        Some(v) if (1..=10).contains(&v) => v as u8,
        _ => {
            corrections.push("physiqueRating".to_owned());
            5
        }
    }
}

/// Coerce an enum field, falling back to its default variant
fn enum_field<T: DeserializeOwned>(
    value: Option<&Value>,
    default: T,
    field: &str,
    corrections: &mut Vec<String>,
) -> T {
    value
        .and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
        .unwrap_or_else(|| {
            corrections.push(field.to_owned());
            default
        })
}

/// Coerce a string field
fn string_field(
    value: Option<&Value>,
    default: &str,
    field: &str,
    corrections: &mut Vec<String>,
) -> String {
    value.and_then(Value::as_str).map_or_else(
        || {
            corrections.push(field.to_owned());
            default.to_owned()
        },
        ToOwned::to_owned,
    )
}

/// Coerce the measurements object, field by field
fn measurements_field(value: Option<&Value>, corrections: &mut Vec<String>) -> BodyMeasurements {
    let empty = Value::Null;
    let object = value.unwrap_or(&empty);

    let mut get = |key: &str, range: NumericRange| {
        let path = format!("measurements.{key}");
        match object.get(key).and_then(Value::as_f64) {
            Some(v) if range.contains(v) => v,
            _ => {
                corrections.push(path);
                range.default
            }
        }
    };

    BodyMeasurements {
        chest_cm: get("chestCm", MEASUREMENT_RANGES[0].1),
        waist_cm: get("waistCm", MEASUREMENT_RANGES[1].1),
        hips_cm: get("hipsCm", MEASUREMENT_RANGES[2].1),
        bicep_cm: get("bicepCm", MEASUREMENT_RANGES[3].1),
        thigh_cm: get("thighCm", MEASUREMENT_RANGES[4].1),
        shoulder_width_cm: get("shoulderWidthCm", MEASUREMENT_RANGES[5].1),
        neck_cm: get("neckCm", MEASUREMENT_RANGES[6].1),
        calf_cm: get("calfCm", MEASUREMENT_RANGES[7].1),
        forearm_cm: get("forearmCm", MEASUREMENT_RANGES[8].1),
        height_cm: get("heightCm", MEASUREMENT_RANGES[9].1),
    }
}

/// Coerce the posture object; an unrecognized quality resets to good
fn posture_field(value: Option<&Value>, corrections: &mut Vec<String>) -> PostureAssessment {
    let empty = Value::Null;
    let object = value.unwrap_or(&empty);

    PostureAssessment {
        quality: enum_field(
            object.get("quality"),
            PostureQuality::Good,
            "posture.quality",
            corrections,
        ),
        notes: string_field(
            object.get("notes"),
            DEFAULT_POSTURE_NOTES,
            "posture.notes",
            corrections,
        ),
    }
}

/// Coerce per-group development levels; an unrecognized level resets that
/// group only, not the whole map
fn muscle_development_field(
    value: Option<&Value>,
    corrections: &mut Vec<String>,
) -> MuscleDevelopment {
    let empty = Value::Null;
    let object = value.unwrap_or(&empty);

    let mut get = |key: &str| {
        enum_field(
            object.get(key),
            DevelopmentLevel::Moderate,
            &format!("muscleDevelopment.{key}"),
            corrections,
        )
    };

    MuscleDevelopment {
        chest: get("chest"),
        back: get("back"),
        shoulders: get("shoulders"),
        arms: get("arms"),
        core: get("core"),
        legs: get("legs"),
    }
}

/// Fallback focus areas when the provider supplied none
fn default_focus_areas() -> Vec<String> {
    vec!["full body strength".to_owned(), "core stability".to_owned()]
}

/// Coerce the recommendations object
fn recommendations_field(value: Option<&Value>, corrections: &mut Vec<String>) -> Recommendations {
    let empty = Value::Null;
    let object = value.unwrap_or(&empty);

    let focus_areas = match object.get("focusAreas").and_then(Value::as_array) {
        Some(items) => {
            let strings: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect();
            // if filtering dropped every element the array was unusable,
            // not intentionally empty
            if strings.is_empty() && !items.is_empty() {
                corrections.push("recommendations.focusAreas".to_owned());
                default_focus_areas()
            } else {
                strings
            }
        }
        None => {
            corrections.push("recommendations.focusAreas".to_owned());
            default_focus_areas()
        }
    };

    Recommendations {
        focus_areas,
        workout_split: string_field(
            object.get("workoutSplit"),
            "Full body 3x per week",
            "recommendations.workoutSplit",
            corrections,
        ),
        nutrition_tips: string_field(
            object.get("nutritionTips"),
            "Maintain a balanced diet with adequate protein intake",
            "recommendations.nutritionTips",
            corrections,
        ),
        progress_goals: string_field(
            object.get("progressGoals"),
            "Build consistency over the next 3 months",
            "recommendations.progressGoals",
            corrections,
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_gets_all_defaults() {
        let result = SchemaValidator::validate(&json!({}));
        let record = result.record;

        assert!((record.body_fat_percentage - 20.0).abs() < f64::EPSILON);
        assert_eq!(record.physique_rating, 5);
        assert_eq!(record.muscle_mass_level, MuscleMassLevel::Moderate);
        assert_eq!(record.fitness_level, FitnessLevel::Intermediate);
        assert!((record.confidence - 0.75).abs() < f64::EPSILON);
        assert_eq!(record.posture.quality, PostureQuality::Good);
        assert_eq!(record.posture.notes, "Normal posture");
        assert!(!result.corrections.is_empty());
    }

    #[test]
    fn test_missing_measurements_get_midpoint_defaults() {
        let result = SchemaValidator::validate(&json!({"bodyFatPercentage": 12.0}));
        let m = result.record.measurements;

        assert!((m.chest_cm - 100.0).abs() < f64::EPSILON);
        assert!((m.waist_cm - 85.0).abs() < f64::EPSILON);
        assert!((m.hips_cm - 95.0).abs() < f64::EPSILON);
        assert!((m.bicep_cm - 35.0).abs() < f64::EPSILON);
        assert!((m.thigh_cm - 55.0).abs() < f64::EPSILON);
        assert!((m.shoulder_width_cm - 45.0).abs() < f64::EPSILON);
        assert!((m.neck_cm - 38.0).abs() < f64::EPSILON);
        assert!((m.calf_cm - 38.0).abs() < f64::EPSILON);
        assert!((m.forearm_cm - 28.0).abs() < f64::EPSILON);
        assert!((m.height_cm - 175.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_thigh_reset_to_default() {
        let result = SchemaValidator::validate(&json!({
            "measurements": {"thighCm": 30.0, "waistCm": 82.0}
        }));

        assert!((result.record.measurements.thigh_cm - 55.0).abs() < f64::EPSILON);
        assert!((result.record.measurements.waist_cm - 82.0).abs() < f64::EPSILON);
        assert!(result
            .corrections
            .iter()
            .any(|c| c == "measurements.thighCm"));
        assert!(!result
            .corrections
            .iter()
            .any(|c| c == "measurements.waistCm"));
    }

    #[test]
    fn test_unrecognized_development_level_resets_group_only() {
        let result = SchemaValidator::validate(&json!({
            "muscleDevelopment": {
                "chest": "herculean",
                "back": "excellent",
                "shoulders": "good",
                "arms": "low",
                "core": "moderate",
                "legs": "good"
            }
        }));
        let dev = result.record.muscle_development;

        assert_eq!(dev.chest, DevelopmentLevel::Moderate);
        assert_eq!(dev.back, DevelopmentLevel::Excellent);
        assert_eq!(dev.arms, DevelopmentLevel::Low);
    }

    #[test]
    fn test_valid_fields_pass_through_unchanged() {
        let raw = json!({
            "bodyFatPercentage": 15.5,
            "muscleMassLevel": "high",
            "physiqueRating": 7,
            "fitnessLevel": "advanced",
            "confidence": 0.9,
            "posture": {"quality": "needs improvement", "notes": "rounded shoulders"}
        });
        let result = SchemaValidator::validate(&raw);

        assert!((result.record.body_fat_percentage - 15.5).abs() < f64::EPSILON);
        assert_eq!(result.record.muscle_mass_level, MuscleMassLevel::High);
        assert_eq!(result.record.physique_rating, 7);
        assert_eq!(result.record.fitness_level, FitnessLevel::Advanced);
        assert_eq!(result.record.posture.quality, PostureQuality::NeedsImprovement);
        assert_eq!(result.record.posture.notes, "rounded shoulders");
    }

    #[test]
    fn test_wrong_types_replaced() {
        let raw = json!({
            "bodyFatPercentage": "fifteen",
            "physiqueRating": 7.5,
            "muscleMassLevel": 3,
            "notes": 42,
            "recommendations": "none"
        });
        let result = SchemaValidator::validate(&raw);

        assert!((result.record.body_fat_percentage - 20.0).abs() < f64::EPSILON);
        assert_eq!(result.record.physique_rating, 5);
        assert_eq!(result.record.muscle_mass_level, MuscleMassLevel::Moderate);
        assert_eq!(result.record.notes, DEFAULT_NOTES);
        assert_eq!(result.record.recommendations.focus_areas.len(), 2);
    }

    #[test]
    fn test_non_string_focus_areas_reset_with_correction() {
        let result = SchemaValidator::validate(&json!({
            "recommendations": {"focusAreas": [1, 2]}
        }));

        assert_eq!(result.record.recommendations.focus_areas.len(), 2);
        assert_eq!(result.record.recommendations.focus_areas[0], "full body strength");
        assert!(result
            .corrections
            .iter()
            .any(|c| c == "recommendations.focusAreas"));

        // a genuinely empty list is kept as-is, and mixed lists keep their
        // string elements without a correction
        let empty = SchemaValidator::validate(&json!({
            "recommendations": {"focusAreas": []}
        }));
        assert!(empty.record.recommendations.focus_areas.is_empty());

        let mixed = SchemaValidator::validate(&json!({
            "recommendations": {"focusAreas": ["legs", 3]}
        }));
        assert_eq!(mixed.record.recommendations.focus_areas, vec!["legs"]);
        assert!(!mixed
            .corrections
            .iter()
            .any(|c| c == "recommendations.focusAreas"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let raw = json!({
            "bodyFatPercentage": 200.0,
            "measurements": {"chestCm": 5.0},
            "muscleMassLevel": "massive"
        });
        let once = SchemaValidator::validate(&raw);
        let reencoded = serde_json::to_value(&once.record).unwrap();
        let twice = SchemaValidator::validate(&reencoded);

        assert_eq!(once.record, twice.record);
        assert!(twice.corrections.is_empty());
    }

    #[test]
    fn test_totality_on_hostile_input() {
        for raw in [
            json!(null),
            json!({"measurements": null}),
            json!({"measurements": [1, 2, 3]}),
            json!({"posture": "slouched"}),
            json!({"muscleDevelopment": 7}),
            json!({"recommendations": {"focusAreas": [1, 2]}}),
        ] {
            let result = SchemaValidator::validate(&raw);
            assert!(BODY_FAT_RANGE.contains(result.record.body_fat_percentage));
            assert!(CONFIDENCE_RANGE.contains(result.record.confidence));
        }
    }
}
