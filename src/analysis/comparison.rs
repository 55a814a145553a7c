// ABOUTME: Deterministic comparison between two validated body scans
// ABOUTME: Produces per-measurement deltas and body fat change for progress tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Scan Comparison
//!
//! Pure delta computation between two validated analyses of the same person,
//! typically the previous scan and the current one. Deltas are signed:
//! positive means the current scan measured higher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BodyAnalysisRecord, BodyMeasurements, MuscleMassLevel};

/// Signed differences between two scans, current minus previous
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanComparison {
    /// Body fat percentage change in points
    pub body_fat_change: f64,
    /// Per-measurement change in centimeters
    pub measurement_changes: BodyMeasurements,
    /// Muscle mass level of the previous scan
    pub previous_muscle_mass: MuscleMassLevel,
    /// Muscle mass level of the current scan
    pub current_muscle_mass: MuscleMassLevel,
    /// Aesthetic score change between the two signatures, when both were
    /// computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aesthetic_score_change: Option<f64>,
    /// When the comparison was computed
    pub compared_at: DateTime<Utc>,
}

impl ScanComparison {
    /// Compare a current scan against a previous one.
    ///
    /// Both records must already be validated; the comparison itself is a
    /// total pure function apart from the timestamp.
    #[must_use]
    pub fn between(previous: &BodyAnalysisRecord, current: &BodyAnalysisRecord) -> Self {
        let p = &previous.measurements;
        let c = &current.measurements;

        Self {
            body_fat_change: current.body_fat_percentage - previous.body_fat_percentage,
            measurement_changes: BodyMeasurements {
                chest_cm: c.chest_cm - p.chest_cm,
                waist_cm: c.waist_cm - p.waist_cm,
                hips_cm: c.hips_cm - p.hips_cm,
                bicep_cm: c.bicep_cm - p.bicep_cm,
                thigh_cm: c.thigh_cm - p.thigh_cm,
                shoulder_width_cm: c.shoulder_width_cm - p.shoulder_width_cm,
                neck_cm: c.neck_cm - p.neck_cm,
                calf_cm: c.calf_cm - p.calf_cm,
                forearm_cm: c.forearm_cm - p.forearm_cm,
                height_cm: c.height_cm - p.height_cm,
            },
            previous_muscle_mass: previous.muscle_mass_level,
            current_muscle_mass: current.muscle_mass_level,
            aesthetic_score_change: None,
            compared_at: Utc::now(),
        }
    }

    /// Attach the aesthetic score delta from the two signatures
    #[must_use]
    pub const fn with_aesthetic_change(mut self, previous: f64, current: f64) -> Self {
        self.aesthetic_score_change = Some(current - previous);
        self
    }

    /// Whether the comparison shows fat loss alongside stable or growing
    /// upper body girths, the usual recomposition target
    #[must_use]
    pub fn indicates_recomposition(&self) -> bool {
        self.body_fat_change < 0.0
            && self.measurement_changes.chest_cm >= 0.0
            && self.measurement_changes.bicep_cm >= 0.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analysis::validator::SchemaValidator;
    use serde_json::json;

    fn scan(body_fat: f64, chest: f64, waist: f64, bicep: f64) -> BodyAnalysisRecord {
        SchemaValidator::validate(&json!({
            "bodyFatPercentage": body_fat,
            "muscleMassLevel": "moderate",
            "measurements": {
                "chestCm": chest, "waistCm": waist, "bicepCm": bicep
            }
        }))
        .record
    }

    #[test]
    fn test_deltas_are_current_minus_previous() {
        let previous = scan(20.0, 100.0, 90.0, 34.0);
        let current = scan(18.5, 102.0, 87.0, 35.0);

        let comparison = ScanComparison::between(&previous, &current);

        assert!((comparison.body_fat_change - (-1.5)).abs() < 1e-9);
        assert!((comparison.measurement_changes.chest_cm - 2.0).abs() < 1e-9);
        assert!((comparison.measurement_changes.waist_cm - (-3.0)).abs() < 1e-9);
        assert!((comparison.measurement_changes.bicep_cm - 1.0).abs() < 1e-9);
        // untouched fields share defaults, so their deltas are zero
        assert!(comparison.measurement_changes.height_cm.abs() < 1e-9);
    }

    #[test]
    fn test_recomposition_detection() {
        let previous = scan(22.0, 100.0, 92.0, 34.0);
        let leaner_and_bigger = scan(20.0, 101.0, 89.0, 35.0);
        let just_smaller = scan(20.0, 97.0, 89.0, 33.0);

        assert!(ScanComparison::between(&previous, &leaner_and_bigger).indicates_recomposition());
        assert!(!ScanComparison::between(&previous, &just_smaller).indicates_recomposition());
    }

    #[test]
    fn test_aesthetic_change_attaches() {
        let previous = scan(20.0, 100.0, 90.0, 34.0);
        let current = scan(19.0, 100.0, 89.0, 34.0);

        let comparison =
            ScanComparison::between(&previous, &current).with_aesthetic_change(60.0, 63.5);

        assert!((comparison.aesthetic_score_change.unwrap() - 3.5).abs() < 1e-9);
    }
}
