//! Type definitions for the diabetes risk calculator

pub mod assessment;
pub mod patient;

pub use assessment::{RiskAssessment, RiskLabel};
pub use patient::{Gender, Hypertension, PatientInputs};
