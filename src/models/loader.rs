//! Model artifact loader: ONNX classifier and fitted scaler

use crate::error::{PredictionError, Result};
use crate::models::onnx::OnnxClassifier;
use crate::models::scaler::ScalerParams;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fs;
use std::path::Path;
use tracing::info;

/// Loader for the classifier and scaler artifacts
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        init_runtime().map_err(|e| unavailable("ONNX Runtime initialization failed", e))?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the ONNX classifier from file
    pub fn load_classifier<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<OnnxClassifier> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        if !path.exists() {
            return Err(PredictionError::ModelUnavailable(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let session = self.build_session(path).map_err(|e| {
            unavailable(&format!("failed to load model from {}", path.display()), e)
        })?;

        let classifier = OnnxClassifier::from_session(name, session);

        info!(
            model = %name,
            input = %classifier.input_name(),
            label_output = ?classifier.label_output(),
            probability_output = ?classifier.probability_output(),
            "Model loaded successfully"
        );

        Ok(classifier)
    }

    fn build_session(&self, path: &Path) -> anyhow::Result<Session> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)?;
        Ok(session)
    }
}

/// Read and validate the JSON scaler artifact persisted next to the model
/// at training time.
pub fn load_scaler_file<P: AsRef<Path>>(path: P) -> Result<ScalerParams> {
    let path = path.as_ref();

    let raw = fs::read_to_string(path)
        .map_err(|e| unavailable(&format!("failed to read scaler {}", path.display()), e))?;
    let parsed: ScalerParams = serde_json::from_str(&raw)
        .map_err(|e| unavailable(&format!("failed to parse scaler {}", path.display()), e))?;
    let params = ScalerParams::new(parsed.mean, parsed.scale)?;

    info!(path = %path.display(), "Scaler parameters loaded");
    Ok(params)
}

fn init_runtime() -> anyhow::Result<()> {
    ort::init().commit()?;
    Ok(())
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> PredictionError {
    PredictionError::ModelUnavailable(format!("{}: {}", what, err))
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_scaler_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mean": [5.5, 40, 140, 40, 27, 0.5, 0.1], "scale": [1, 20, 40, 20, 5, 0.5, 0]}}"#
        )
        .unwrap();

        let params = load_scaler_file(file.path()).unwrap();
        assert_eq!(params.mean[2], 140.0);
        // zero scale replaced
        assert_eq!(params.scale[6], 1.0);
    }

    #[test]
    fn test_load_scaler_wrong_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mean": [1, 2, 3], "scale": [1, 1, 1]}}"#).unwrap();

        let err = load_scaler_file(file.path()).unwrap_err();
        assert!(matches!(err, PredictionError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_scaler_missing_or_malformed() {
        let err = load_scaler_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, PredictionError::ModelUnavailable(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_scaler_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse scaler"));
    }

    #[test]
    fn test_missing_model_file() {
        let loader = ModelLoader::default();
        let err = loader
            .load_classifier("does/not/exist.onnx", "lightgbm")
            .unwrap_err();
        assert!(matches!(err, PredictionError::ModelUnavailable(_)));
    }
}
