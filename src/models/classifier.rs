//! Classifier capability used by the risk predictor

use anyhow::Result;

/// A pre-trained binary classifier.
///
/// Implementations are loaded once and only read afterwards, so a single
/// instance may serve any number of concurrent predictions.
pub trait Classifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Predict the category for one scaled feature vector.
    fn predict(&self, features: &[f64]) -> Result<i64>;
}
