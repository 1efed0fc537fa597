//! Feature extraction for diabetes risk model inference.
//!
//! Builds the seven-value feature vector in the exact order the classifier
//! and scaler were fit on. Reordering or dropping a field still yields a
//! prediction, just a meaningless one, so the order lives in one place here.

use crate::error::{PredictionError, Result};
use crate::types::patient::PatientInputs;

/// Number of features the classifier expects
pub const FEATURE_COUNT: usize = 7;

/// Feature names in classifier order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "HbA1c_level",
    "AHD_level",
    "blood_glucose_level",
    "age",
    "bmi",
    "gender",
    "hypertension",
];

/// Body-mass index from height in centimetres and weight in kilograms.
///
/// Not rounded. Returns a non-finite value when `height_cm` is zero; callers
/// keep height within the form range (>= 30 cm).
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / height_m.powi(2)
}

/// Ordered classifier input, created per request and never mutated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector from already-encoded values.
    pub fn new(
        hba1c: f64,
        ahd: f64,
        blood_glucose: f64,
        age: f64,
        bmi: f64,
        gender: f64,
        hypertension: f64,
    ) -> Self {
        Self([hba1c, ahd, blood_glucose, age, bmi, gender, hypertension])
    }

    /// Build a vector from a raw slice, rejecting the wrong length.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_COUNT] =
            values.try_into().map_err(|_| PredictionError::InputShape {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self(array))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn bmi(&self) -> f64 {
        self.0[4]
    }
}

/// Transforms form inputs into classifier features.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the feature vector for one form submission.
    pub fn extract(&self, inputs: &PatientInputs) -> FeatureVector {
        let bmi = compute_bmi(inputs.height_cm, inputs.weight_kg);

        FeatureVector::new(
            inputs.hba1c,
            inputs.ahd as f64,
            inputs.blood_glucose,
            inputs.age as f64,
            bmi,
            inputs.gender.encode() as f64,
            inputs.hypertension.encode() as f64,
        )
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::patient::{Gender, Hypertension};

    #[test]
    fn test_compute_bmi() {
        let bmi = compute_bmi(170.0, 70.0);
        assert!((bmi - 70.0 / (1.7 * 1.7)).abs() < 1e-9);
        assert!((bmi - 24.22).abs() < 0.01);
    }

    #[test]
    fn test_bmi_scales_with_weight() {
        for height in [30.0, 150.0, 170.0, 212.0] {
            let single = compute_bmi(height, 40.0);
            let double = compute_bmi(height, 80.0);
            assert_eq!(double, single * 2.0);
        }
    }

    #[test]
    fn test_bmi_zero_height_non_finite() {
        assert!(!compute_bmi(0.0, 70.0).is_finite());
    }

    #[test]
    fn test_feature_extraction_order() {
        let extractor = FeatureExtractor::new();
        let inputs = PatientInputs {
            hba1c: 6.0,
            ahd: 50,
            blood_glucose: 120.0,
            age: 30,
            height_cm: 170.0,
            weight_kg: 70.0,
            gender: Gender::Female,
            hypertension: Hypertension::No,
        };

        let features = extractor.extract(&inputs);
        let values = features.as_slice();

        assert_eq!(values.len(), extractor.feature_count());
        assert_eq!(values[0], 6.0);
        assert_eq!(values[1], 50.0);
        assert_eq!(values[2], 120.0);
        assert_eq!(values[3], 30.0);
        assert!((values[4] - 24.22).abs() < 0.01);
        assert_eq!(values[5], 1.0);
        assert_eq!(values[6], 0.0);
        assert_eq!(features.bmi(), values[4]);
    }

    #[test]
    fn test_from_slice_wrong_length() {
        let err = FeatureVector::from_slice(&[1.0; 6]).unwrap_err();
        assert_eq!(
            err,
            PredictionError::InputShape {
                expected: 7,
                actual: 6
            }
        );
        assert!(FeatureVector::from_slice(&[1.0; 8]).is_err());
        assert!(FeatureVector::from_slice(&[]).is_err());
        assert!(FeatureVector::from_slice(&[1.0; 7]).is_ok());
    }

    #[test]
    fn test_feature_names() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_names().len(), 7);
        assert_eq!(extractor.feature_names()[4], "bmi");
    }
}
