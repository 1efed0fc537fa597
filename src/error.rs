//! Error types for risk prediction

use thiserror::Error;

/// Errors surfaced at the prediction call boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Feature vector does not have the length the classifier was trained on
    #[error("Feature vector has {actual} values, expected {expected}")]
    InputShape { expected: usize, actual: usize },

    /// Classifier or scaler could not be loaded
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Scaling or classifier inference failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// A form value is out of range or not a recognized option
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PredictionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PredictionError::InputShape {
            expected: 7,
            actual: 6,
        };
        assert_eq!(err.to_string(), "Feature vector has 6 values, expected 7");

        let err = PredictionError::Inference("non-finite value".to_string());
        assert_eq!(err.to_string(), "Inference failed: non-finite value");
    }
}
