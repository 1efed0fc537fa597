//! Risk assessment data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-valued risk label rendered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Not High Risk")]
    NotHighRisk,
}

impl RiskLabel {
    /// Map a raw classifier category to a label.
    ///
    /// Only category 1 is high risk. Any other value, including unexpected
    /// categories such as 2 or -1, maps to `NotHighRisk`.
    pub fn from_category(category: i64) -> Self {
        if category == 1 {
            RiskLabel::HighRisk
        } else {
            RiskLabel::NotHighRisk
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::HighRisk => "High Risk",
            RiskLabel::NotHighRisk => "Not High Risk",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one risk assessment, as shown to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Rendered risk label
    pub label: RiskLabel,

    /// Raw categorical output of the classifier
    pub raw_prediction: i64,

    /// Body-mass index derived from height and weight
    pub bmi: f64,

    /// Unscaled feature vector in classifier order
    pub features: Vec<f64>,

    /// Assessment timestamp
    pub timestamp: DateTime<Utc>,
}

impl RiskAssessment {
    /// Create a new assessment
    pub fn new(label: RiskLabel, raw_prediction: i64, bmi: f64, features: Vec<f64>) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            label,
            raw_prediction,
            bmi,
            features,
            timestamp: Utc::now(),
        }
    }
}
