//! Raw patient form inputs for the diabetes risk calculator

use crate::error::{PredictionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive numeric range accepted by a form field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
}

impl InputRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const HBA1C_RANGE: InputRange = InputRange::new(3.5, 9.0);
pub const BLOOD_GLUCOSE_RANGE: InputRange = InputRange::new(60.0, 400.0);
pub const AHD_RANGE: InputRange = InputRange::new(0.0, 100.0);
pub const AGE_RANGE: InputRange = InputRange::new(1.0, 150.0);
pub const HEIGHT_CM_RANGE: InputRange = InputRange::new(30.0, 300.0);
pub const WEIGHT_KG_RANGE: InputRange = InputRange::new(1.0, 500.0);

/// Gender as selected on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Model encoding (1 = Female, 0 = Male)
    pub fn encode(self) -> u8 {
        match self {
            Gender::Female => 1,
            Gender::Male => 0,
        }
    }
}

impl FromStr for Gender {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Female" => Ok(Gender::Female),
            "Male" => Ok(Gender::Male),
            other => Err(PredictionError::InvalidInput(format!(
                "gender must be \"Female\" or \"Male\", got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "Female"),
            Gender::Male => write!(f, "Male"),
        }
    }
}

/// Hypertension answer as selected on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hypertension {
    Yes,
    No,
}

impl Hypertension {
    /// Model encoding (1 = Yes, 0 = No)
    pub fn encode(self) -> u8 {
        match self {
            Hypertension::Yes => 1,
            Hypertension::No => 0,
        }
    }
}

impl FromStr for Hypertension {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Yes" => Ok(Hypertension::Yes),
            "No" => Ok(Hypertension::No),
            other => Err(PredictionError::InvalidInput(format!(
                "hypertension must be \"Yes\" or \"No\", got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Hypertension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hypertension::Yes => write!(f, "Yes"),
            Hypertension::No => write!(f, "No"),
        }
    }
}

/// One filled-in form: the raw values before feature extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInputs {
    /// HbA1c level (%)
    pub hba1c: f64,
    /// AHD level
    pub ahd: u32,
    /// Blood glucose level (mg/dL)
    pub blood_glucose: f64,
    /// Age in years
    pub age: u32,
    /// Height in centimetres
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    pub gender: Gender,
    pub hypertension: Hypertension,
}

impl PatientInputs {
    /// Check every numeric field against its form range.
    pub fn validate(&self) -> Result<()> {
        check("hba1c", self.hba1c, HBA1C_RANGE)?;
        check("ahd", self.ahd as f64, AHD_RANGE)?;
        check("blood_glucose", self.blood_glucose, BLOOD_GLUCOSE_RANGE)?;
        check("age", self.age as f64, AGE_RANGE)?;
        check("height_cm", self.height_cm, HEIGHT_CM_RANGE)?;
        check("weight_kg", self.weight_kg, WEIGHT_KG_RANGE)?;
        Ok(())
    }
}

fn check(field: &str, value: f64, range: InputRange) -> Result<()> {
    // NaN fails `contains`, so it is rejected here too
    if range.contains(value) {
        Ok(())
    } else {
        Err(PredictionError::InvalidInput(format!(
            "{} = {} is outside [{}, {}]",
            field, value, range.min, range.max
        )))
    }
}

impl Default for PatientInputs {
    fn default() -> Self {
        Self {
            hba1c: 6.0,
            ahd: 50,
            blood_glucose: 120.0,
            age: 30,
            height_cm: 170.0,
            weight_kg: 70.0,
            gender: Gender::Female,
            hypertension: Hypertension::Yes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_table() {
        assert_eq!("Female".parse::<Gender>().unwrap().encode(), 1);
        assert_eq!("Male".parse::<Gender>().unwrap().encode(), 0);
        assert_eq!("Yes".parse::<Hypertension>().unwrap().encode(), 1);
        assert_eq!("No".parse::<Hypertension>().unwrap().encode(), 0);
    }

    #[test]
    fn test_unknown_options_rejected() {
        for value in ["female", "M", "", "Other"] {
            assert!(matches!(
                value.parse::<Gender>(),
                Err(PredictionError::InvalidInput(_))
            ));
        }
        for value in ["yes", "N", "", "Maybe"] {
            assert!(matches!(
                value.parse::<Hypertension>(),
                Err(PredictionError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let inputs = PatientInputs::default();
        assert!(inputs.validate().is_ok());
        assert_eq!(inputs.height_cm, 170.0);
        assert_eq!(inputs.gender, Gender::Female);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let mut inputs = PatientInputs::default();
        inputs.hba1c = 3.5;
        inputs.height_cm = 300.0;
        inputs.ahd = 0;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut inputs = PatientInputs::default();
        inputs.height_cm = 29.0;
        let err = inputs.validate().unwrap_err();
        assert!(err.to_string().contains("height_cm"));

        let mut inputs = PatientInputs::default();
        inputs.age = 0;
        assert!(inputs.validate().is_err());

        let mut inputs = PatientInputs::default();
        inputs.blood_glucose = f64::NAN;
        assert!(inputs.validate().is_err());
    }
}
