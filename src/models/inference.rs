//! Diabetes risk inference: scaling, classification and label mapping

use crate::config::{AppConfig, ScalingMode};
use crate::error::{PredictionError, Result};
use crate::feature_extractor::{FeatureExtractor, FeatureVector};
use crate::models::classifier::Classifier;
use crate::models::loader::{load_scaler_file, ModelLoader};
use crate::models::scaler::FeatureScaling;
use crate::types::assessment::{RiskAssessment, RiskLabel};
use crate::types::patient::PatientInputs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of one prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    /// Rendered risk label
    pub label: RiskLabel,
    /// Raw categorical output of the classifier
    pub raw_prediction: i64,
}

/// Risk predictor holding the classifier and scaling loaded at startup.
///
/// Stateless per call: nothing is mutated between predictions, so one
/// instance can be shared across threads behind an `Arc`.
pub struct RiskPredictor {
    classifier: Arc<dyn Classifier>,
    scaling: FeatureScaling,
    extractor: FeatureExtractor,
}

impl RiskPredictor {
    /// Load the classifier (and scaler, for fitted scaling) from configuration.
    ///
    /// Fails with `ModelUnavailable` if any artifact cannot be loaded.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let scaling = match config.model.scaling {
            ScalingMode::Fitted => {
                let scaler_path = config.model.scaler_path.as_deref().ok_or_else(|| {
                    PredictionError::ModelUnavailable(
                        "fitted scaling requires model.scaler_path".to_string(),
                    )
                })?;
                FeatureScaling::Fitted(load_scaler_file(scaler_path)?)
            }
            ScalingMode::PerSample => FeatureScaling::PerSample,
        };

        let loader = ModelLoader::with_threads(config.model.onnx_threads.max(1))?;
        let classifier = loader.load_classifier(&config.model.model_path, &config.model.name)?;

        info!(
            model = %config.model.name,
            scaling = scaling.mode_name(),
            "Risk predictor ready"
        );

        Ok(Self::with_classifier(Arc::new(classifier), scaling))
    }

    /// Build a predictor around an already-loaded classifier
    pub fn with_classifier(classifier: Arc<dyn Classifier>, scaling: FeatureScaling) -> Self {
        Self {
            classifier,
            scaling,
            extractor: FeatureExtractor::new(),
        }
    }

    pub fn scaling(&self) -> &FeatureScaling {
        &self.scaling
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Scale the features, run the classifier and map its category to a label.
    pub fn predict_risk(&self, features: &FeatureVector) -> Result<Prediction> {
        let result = self
            .scaling
            .apply(features)
            .and_then(|scaled| self.classify(&scaled));

        match result {
            Ok(raw_prediction) => {
                let label = RiskLabel::from_category(raw_prediction);
                debug!(
                    model = %self.classifier.name(),
                    scaling = self.scaling.mode_name(),
                    raw_prediction = raw_prediction,
                    label = %label,
                    "Prediction complete"
                );
                Ok(Prediction {
                    label,
                    raw_prediction,
                })
            }
            Err(e) => {
                error!(model = %self.classifier.name(), error = %e, "Prediction failed");
                Err(e)
            }
        }
    }

    /// Predict from an unchecked slice, rejecting the wrong length.
    pub fn predict_raw(&self, values: &[f64]) -> Result<Prediction> {
        let features = FeatureVector::from_slice(values)?;
        self.predict_risk(&features)
    }

    /// Validate a form submission and produce a full assessment.
    pub fn assess(&self, inputs: &PatientInputs) -> Result<RiskAssessment> {
        inputs.validate()?;

        let features = self.extractor.extract(inputs);
        let prediction = self.predict_risk(&features)?;

        Ok(RiskAssessment::new(
            prediction.label,
            prediction.raw_prediction,
            features.bmi(),
            features.to_vec(),
        ))
    }

    /// Run the classifier, turning errors and panics into `Inference` errors.
    fn classify(&self, scaled: &[f64]) -> Result<i64> {
        let classifier = &self.classifier;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| classifier.predict(scaled)));

        match outcome {
            Ok(Ok(category)) => Ok(category),
            Ok(Err(e)) => Err(PredictionError::Inference(format!(
                "{} classifier: {:#}",
                classifier.name(),
                e
            ))),
            Err(payload) => Err(PredictionError::Inference(format!(
                "{} classifier panicked: {}",
                classifier.name(),
                panic_message(payload.as_ref())
            ))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
