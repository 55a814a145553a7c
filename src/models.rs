// ABOUTME: Core data structures for body composition analysis and signatures
// ABOUTME: Defines BodyAnalysisRecord, BodySignature, and the enums they carry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ReddyFit

//! # Analysis Data Models
//!
//! The central entity is [`BodyAnalysisRecord`]: created by the response
//! extractor from raw provider text, coerced into range by the schema
//! validator, annotated with a blended confidence, then consumed read-only
//! by the signature engine. Wire names are camelCase to match the provider
//! contract (the JSON shape embedded in the analysis prompt).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall muscle mass level estimated from the photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleMassLevel {
    /// Little visible muscle mass
    Low,
    /// Average muscle mass
    Moderate,
    /// Well above average muscle mass
    High,
}

/// Estimated training experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    /// New to structured training
    Beginner,
    /// Consistent training history
    Intermediate,
    /// Multi-year training history with visible development
    Advanced,
}

/// Posture quality assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostureQuality {
    /// Good spinal alignment, no notable imbalances
    #[serde(rename = "good")]
    Good,
    /// Minor imbalances worth monitoring
    #[serde(rename = "fair")]
    Fair,
    /// Imbalances that should be addressed in programming
    #[serde(rename = "needs improvement")]
    NeedsImprovement,
}

/// Development level of a single muscle group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevelopmentLevel {
    /// Underdeveloped relative to the rest of the physique
    Low,
    /// Average development
    Moderate,
    /// Above average development
    Good,
    /// Standout muscle group
    Excellent,
}

/// The ten estimated linear measurements, in centimeters.
///
/// Wire keys use the `*Cm` suffix the provider prompt requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    /// Chest circumference
    #[serde(rename = "chestCm")]
    pub chest_cm: f64,
    /// Waist circumference
    #[serde(rename = "waistCm")]
    pub waist_cm: f64,
    /// Hip circumference
    #[serde(rename = "hipsCm")]
    pub hips_cm: f64,
    /// Relaxed bicep circumference
    #[serde(rename = "bicepCm")]
    pub bicep_cm: f64,
    /// Thigh circumference
    #[serde(rename = "thighCm")]
    pub thigh_cm: f64,
    /// Shoulder width
    #[serde(rename = "shoulderWidthCm")]
    pub shoulder_width_cm: f64,
    /// Neck circumference
    #[serde(rename = "neckCm")]
    pub neck_cm: f64,
    /// Calf circumference
    #[serde(rename = "calfCm")]
    pub calf_cm: f64,
    /// Forearm circumference
    #[serde(rename = "forearmCm")]
    pub forearm_cm: f64,
    /// Standing height
    #[serde(rename = "heightCm")]
    pub height_cm: f64,
}

/// Posture quality and free-form observations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureAssessment {
    /// Overall posture quality
    pub quality: PostureQuality,
    /// Notable imbalances or asymmetries
    pub notes: String,
}

/// Per-muscle-group development assessment for the six tracked groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleDevelopment {
    /// Chest development
    pub chest: DevelopmentLevel,
    /// Back development
    pub back: DevelopmentLevel,
    /// Shoulder development
    pub shoulders: DevelopmentLevel,
    /// Arm development
    pub arms: DevelopmentLevel,
    /// Core development
    pub core: DevelopmentLevel,
    /// Leg development
    pub legs: DevelopmentLevel,
}

/// Training and nutrition recommendations derived from the analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    /// Muscle groups or qualities to prioritize next
    pub focus_areas: Vec<String>,
    /// Suggested weekly training split
    pub workout_split: String,
    /// Nutrition guidance for the current composition
    pub nutrition_tips: String,
    /// Goals for the next training block
    pub progress_goals: String,
}

/// Fully validated body composition analysis.
///
/// Every numeric field is within its documented range and every enum field
/// is a recognized variant once the schema validator has run; downstream
/// consumers (confidence scorer, signature engine) rely on this
/// unconditionally and do not re-validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyAnalysisRecord {
    /// Estimated body fat percentage, within [5, 50]
    pub body_fat_percentage: f64,
    /// Overall muscle mass level
    pub muscle_mass_level: MuscleMassLevel,
    /// Overall physique rating, within [1, 10]
    pub physique_rating: u8,
    /// The ten estimated measurements
    pub measurements: BodyMeasurements,
    /// Posture assessment
    pub posture: PostureAssessment,
    /// Estimated training experience
    pub fitness_level: FitnessLevel,
    /// Per-group development levels
    pub muscle_development: MuscleDevelopment,
    /// Training and nutrition recommendations
    pub recommendations: Recommendations,
    /// Blended analysis confidence, within [0, 1]
    pub confidence: f64,
    /// Free-form provider notes
    pub notes: String,
}

/// Body type classification derived from measurement ratios.
///
/// Exactly one of the six categories always applies; rules are evaluated in
/// a fixed priority order by the signature engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Wide shoulders tapering to a narrow waist
    #[serde(rename = "V-Taper Aesthetic")]
    VTaperAesthetic,
    /// Strong shoulder-to-waist ratio with a developed chest
    #[serde(rename = "Classic Physique")]
    ClassicPhysique,
    /// Waist, hips, and chest of similar girth
    #[serde(rename = "Rectangular Build")]
    RectangularBuild,
    /// Waist girth exceeding chest girth
    #[serde(rename = "Apple Shape")]
    AppleShape,
    /// Hip girth exceeding chest girth with a defined waist
    #[serde(rename = "Pear Shape")]
    PearShape,
    /// No dominant pattern
    #[serde(rename = "Balanced Build")]
    BalancedBuild,
}

impl BodyType {
    /// Human-readable classification label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VTaperAesthetic => "V-Taper Aesthetic",
            Self::ClassicPhysique => "Classic Physique",
            Self::RectangularBuild => "Rectangular Build",
            Self::AppleShape => "Apple Shape",
            Self::PearShape => "Pear Shape",
            Self::BalancedBuild => "Balanced Build",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six named measurement ratios behind a signature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureMetrics {
    /// Waist girth over hip girth (V-taper indicator)
    pub waist_to_hip_ratio: f64,
    /// Shoulder width over waist girth (same value as the Adonis index)
    pub shoulder_to_waist_ratio: f64,
    /// Chest girth over waist girth (upper body development)
    pub chest_to_waist_ratio: f64,
    /// Bicep girth over chest girth (proportional arm development)
    pub arm_to_chest_ratio: f64,
    /// Thigh girth over waist girth (leg-torso harmony)
    pub leg_torso_balance: f64,
    /// Upper girths over lower girths (upper-lower balance)
    pub upper_lower_symmetry: f64,
}

/// Deterministic mathematical fingerprint of a physique.
///
/// Computed once per validated record by the signature engine; immutable
/// afterward. Identical measurements always produce identical signatures,
/// which is what makes the `unique_id` usable for identity and comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySignature {
    /// Human-readable identifier: `BODYTYPE-BF%-HASH6-ADONIS`
    pub unique_id: String,
    /// Closeness of the Adonis index to the golden ratio, scaled to [~0, 100]
    pub golden_ratio_score: f64,
    /// Shoulder-to-waist ratio
    pub adonis_index: f64,
    /// Proportion symmetry, scaled to [0, 100]
    pub symmetry_coefficient: f64,
    /// Non-cryptographic rolling-hash fingerprint, uppercase hex
    pub composition_hash: String,
    /// Ratio-derived classification
    pub body_type_classification: BodyType,
    /// Composite aesthetic score, within [0, 100]
    pub aesthetic_score: f64,
    /// The six underlying ratios
    pub detailed_metrics: SignatureMetrics,
}

/// Final result of one analysis request: the validated record with its
/// signature attached, serialized the way the scan API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyScanResult {
    /// The validated, confidence-scored analysis
    #[serde(flatten)]
    pub analysis: BodyAnalysisRecord,
    /// The derived signature
    #[serde(rename = "bodySignature")]
    pub body_signature: BodySignature,
}

/// One photo submitted for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Base64-encoded image payload (no data-URL prefix)
    pub base64: String,
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
}

impl ImageData {
    /// Create a JPEG image payload from base64 data
    #[must_use]
    pub fn jpeg(base64: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: "image/jpeg".to_owned(),
        }
    }

    /// Encode raw image bytes into a payload
    #[must_use]
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            base64: BASE64.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Render as a `data:` URL for providers that take image URLs
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_posture_quality_wire_names() {
        let quality: PostureQuality = serde_json::from_str("\"needs improvement\"").unwrap();
        assert_eq!(quality, PostureQuality::NeedsImprovement);
        assert_eq!(
            serde_json::to_string(&PostureQuality::Good).unwrap(),
            "\"good\""
        );
    }

    #[test]
    fn test_body_type_round_trip() {
        let json = serde_json::to_string(&BodyType::VTaperAesthetic).unwrap();
        assert_eq!(json, "\"V-Taper Aesthetic\"");
        let parsed: BodyType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BodyType::VTaperAesthetic);
    }

    #[test]
    fn test_measurements_wire_keys() {
        let json = r#"{
            "chestCm": 102, "waistCm": 82, "hipsCm": 98, "bicepCm": 36,
            "thighCm": 58, "shoulderWidthCm": 45, "neckCm": 38, "calfCm": 38,
            "forearmCm": 28, "heightCm": 175
        }"#;
        let m: BodyMeasurements = serde_json::from_str(json).unwrap();
        assert!((m.shoulder_width_cm - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_data_url() {
        let image = ImageData::jpeg("QUJD");
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,QUJD");
    }

    #[test]
    fn test_image_from_bytes() {
        let image = ImageData::from_bytes(b"ABC", "image/png");
        assert_eq!(image.base64, "QUJD");
        assert_eq!(image.mime_type, "image/png");
    }
}
