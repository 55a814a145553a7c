// ABOUTME: Deterministic body signature derivation from validated measurements
// ABOUTME: Ratio metrics, classification, aesthetic score, fingerprint hash and uniqueId
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Signature Engine
//!
//! Pure function from a validated [`BodyAnalysisRecord`] to a reproducible
//! [`BodySignature`]. No I/O, no randomness: bit-identical measurements
//! always produce the same fingerprint and `uniqueId`, which is what makes
//! signatures usable for identity and scan comparison.
//!
//! All divisions are safe because the schema validator guarantees non-zero,
//! in-range denominators.

use crate::models::{BodyAnalysisRecord, BodySignature, BodyType, SignatureMetrics};

/// Golden ratio, the aesthetic target for the Adonis index
pub const PHI: f64 = 1.618_034;

/// Ideal waist-to-hip ratio
const IDEAL_WAIST_TO_HIP: f64 = 0.85;
/// Ideal chest-to-waist ratio
const IDEAL_CHEST_TO_WAIST: f64 = 1.3;
/// Ideal arm-to-chest ratio
const IDEAL_ARM_TO_CHEST: f64 = 0.36;
/// Ideal leg-torso balance
const IDEAL_LEG_TORSO: f64 = 0.7;

/// Hex characters of the composition hash carried into the `uniqueId`
const UNIQUE_ID_HASH_LEN: usize = 6;

/// Derives deterministic signatures from validated analyses
pub struct SignatureEngine;

impl SignatureEngine {
    /// Compute the signature for a validated record.
    ///
    /// The raw golden-ratio score and symmetry coefficient live in roughly
    /// [0, 1] and feed the aesthetic formula unscaled; the returned fields
    /// carry them multiplied by 100 for display, matching the stored API
    /// shape. The Adonis index and detailed ratios are rounded to 3
    /// decimals, scores to 2.
    #[must_use]
    pub fn compute(record: &BodyAnalysisRecord) -> BodySignature {
        let m = &record.measurements;

        let adonis_index = m.shoulder_width_cm / m.waist_cm;
        // can go negative far from PHI; only the aesthetic total is clamped
        let golden_ratio_score = 1.0 - (adonis_index - PHI).abs() / PHI;

        let waist_to_hip = m.waist_cm / m.hips_cm;
        let chest_to_waist = m.chest_cm / m.waist_cm;
        let arm_to_chest = m.bicep_cm / m.chest_cm;
        let leg_torso = m.thigh_cm / m.waist_cm;
        let upper_lower = (m.chest_cm + m.shoulder_width_cm) / (m.thigh_cm + m.calf_cm);

        let symmetry_variance = (waist_to_hip - IDEAL_WAIST_TO_HIP).abs()
            + (chest_to_waist - IDEAL_CHEST_TO_WAIST).abs()
            + (arm_to_chest - IDEAL_ARM_TO_CHEST).abs()
            + (leg_torso - IDEAL_LEG_TORSO).abs();
        let symmetry_coefficient = (1.0 - symmetry_variance).max(0.0);

        let composition_hash = Self::composition_hash(record, adonis_index, waist_to_hip, chest_to_waist, arm_to_chest);

        let body_type = Self::classify(adonis_index, waist_to_hip, chest_to_waist, m.waist_cm, m.chest_cm, m.hips_cm);

        let aesthetic_score = (golden_ratio_score * 40.0
            + symmetry_coefficient * 30.0
            + (100.0 - record.body_fat_percentage * 2.0) * 0.2
            + f64::from(record.physique_rating))
        .clamp(0.0, 100.0);

        let unique_id = format!(
            "{}-BF{:.1}-{}-AI{:.2}",
            body_type.as_str().split_whitespace().collect::<String>(),
            record.body_fat_percentage,
            composition_hash.chars().take(UNIQUE_ID_HASH_LEN).collect::<String>(),
            adonis_index,
        );

        BodySignature {
            unique_id,
            golden_ratio_score: round_to(golden_ratio_score * 100.0, 2),
            adonis_index: round_to(adonis_index, 3),
            symmetry_coefficient: round_to(symmetry_coefficient * 100.0, 2),
            composition_hash,
            body_type_classification: body_type,
            aesthetic_score: round_to(aesthetic_score, 2),
            detailed_metrics: SignatureMetrics {
                waist_to_hip_ratio: round_to(waist_to_hip, 3),
                shoulder_to_waist_ratio: round_to(adonis_index, 3),
                chest_to_waist_ratio: round_to(chest_to_waist, 3),
                arm_to_chest_ratio: round_to(arm_to_chest, 3),
                leg_torso_balance: round_to(leg_torso, 3),
                upper_lower_symmetry: round_to(upper_lower, 3),
            },
        }
    }

    /// First matching rule wins; evaluated in this exact priority order
    const fn classify(
        adonis_index: f64,
        waist_to_hip: f64,
        chest_to_waist: f64,
        waist: f64,
        chest: f64,
        hips: f64,
    ) -> BodyType {
        if adonis_index >= 1.5 && waist_to_hip < 0.9 {
            BodyType::VTaperAesthetic
        } else if adonis_index >= 1.4 && chest_to_waist >= 1.3 {
            BodyType::ClassicPhysique
        } else if waist_to_hip > 0.95 && chest_to_waist < 1.2 {
            BodyType::RectangularBuild
        } else if waist > chest {
            BodyType::AppleShape
        } else if hips > chest && waist_to_hip < 0.85 {
            BodyType::PearShape
        } else {
            BodyType::BalancedBuild
        }
    }

    /// Fingerprint over the key composition values.
    ///
    /// The delimited input string renders numbers exactly as the stored
    /// analyses always have (integral values without a decimal point), so
    /// the fingerprint stays bit-exact across releases.
    fn composition_hash(
        record: &BodyAnalysisRecord,
        adonis_index: f64,
        waist_to_hip: f64,
        chest_to_waist: f64,
        arm_to_chest: f64,
    ) -> String {
        let m = &record.measurements;
        let input = format!(
            "{:.2}-{adonis_index:.3}-{waist_to_hip:.3}-{chest_to_waist:.3}-{arm_to_chest:.3}-{}-{}-{}",
            record.body_fat_percentage,
            plain_number(m.chest_cm),
            plain_number(m.waist_cm),
            plain_number(m.hips_cm),
        );
        Self::rolling_hash(&input)
    }

    /// 32-bit rolling hash (`hash*31 + code`, signed wrap), rendered as the
    /// uppercase hex of its absolute value. A fingerprint, not cryptography;
    /// collisions are acceptable, reproducibility is not negotiable.
    fn rolling_hash(input: &str) -> String {
        let mut hash: i32 = 0;
        for c in input.chars() {
            hash = hash.wrapping_mul(31).wrapping_add(c as i32);
        }
        format!("{:X}", hash.unsigned_abs())
    }
}

/// Round to `places` decimal digits
fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Render a number the way the upstream JSON always did: integral values
/// without a decimal point, fractional values as-is
fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
