//! Classifier loading and risk inference

pub mod classifier;
pub mod inference;
pub mod loader;
pub mod onnx;
pub mod scaler;

pub use classifier::Classifier;
pub use inference::{Prediction, RiskPredictor};
pub use loader::ModelLoader;
pub use onnx::OnnxClassifier;
pub use scaler::{FeatureScaling, ScalerParams};
