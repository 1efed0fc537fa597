//! Diabetes Risk Calculator Library
//!
//! Turns a single clinical form (HbA1c, AHD, blood glucose, age, height,
//! weight, gender, hypertension) into a seven-feature vector, scales it and
//! runs a pre-trained binary classifier to label the patient "High Risk" or
//! "Not High Risk".

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod models;
pub mod statistics;
pub mod types;

pub use config::AppConfig;
pub use error::PredictionError;
pub use feature_extractor::{compute_bmi, FeatureExtractor, FeatureVector};
pub use models::inference::{Prediction, RiskPredictor};
pub use types::{assessment::RiskAssessment, assessment::RiskLabel, patient::PatientInputs};
