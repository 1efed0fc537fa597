//! Standard scaling of the feature vector before inference

use crate::error::{PredictionError, Result};
use crate::feature_extractor::{FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Per-feature standardization parameters, `z = (x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Per-feature mean
    #[serde(alias = "mean_")]
    pub mean: Vec<f64>,

    /// Per-feature standard deviation
    #[serde(alias = "scale_")]
    pub scale: Vec<f64>,
}

impl ScalerParams {
    /// Build parameters, checking shape and finiteness.
    ///
    /// Zero scales are replaced by 1 so constant features pass through
    /// centred instead of dividing by zero.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != FEATURE_COUNT || scale.len() != FEATURE_COUNT {
            return Err(PredictionError::ModelUnavailable(format!(
                "scaler has {} means and {} scales, expected {}",
                mean.len(),
                scale.len(),
                FEATURE_COUNT
            )));
        }

        if let Some(v) = mean.iter().chain(scale.iter()).find(|v| !v.is_finite()) {
            return Err(PredictionError::ModelUnavailable(format!(
                "scaler contains non-finite parameter {}",
                v
            )));
        }

        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self { mean, scale })
    }

    /// Fit mean and population standard deviation over the given samples.
    pub fn fit(samples: &[FeatureVector]) -> Result<Self> {
        if samples.is_empty() {
            return Err(PredictionError::Inference(
                "cannot fit scaler on zero samples".to_string(),
            ));
        }

        let n = samples.len() as f64;
        let mut mean = vec![0.0; FEATURE_COUNT];
        for sample in samples {
            for (m, x) in mean.iter_mut().zip(sample.as_slice()) {
                *m += x / n;
            }
        }

        let mut scale = vec![0.0; FEATURE_COUNT];
        for sample in samples {
            for ((s, x), m) in scale.iter_mut().zip(sample.as_slice()).zip(&mean) {
                *s += (x - m).powi(2) / n;
            }
        }
        for s in scale.iter_mut() {
            *s = s.sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(Self { mean, scale })
    }

    /// Apply the transform to one sample.
    ///
    /// The fields are public, so the shape is checked here as well as in `new`.
    pub fn transform(&self, features: &FeatureVector) -> Result<[f64; FEATURE_COUNT]> {
        let actual = self.mean.len().min(self.scale.len());
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(PredictionError::InputShape {
                expected: FEATURE_COUNT,
                actual,
            });
        }

        let mut out = [0.0; FEATURE_COUNT];
        for (i, x) in features.as_slice().iter().enumerate() {
            out[i] = (x - self.mean[i]) / self.scale[i];
        }
        Ok(out)
    }
}

/// How features are scaled before reaching the classifier
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureScaling {
    /// Apply parameters fit once on training data
    Fitted(ScalerParams),
    /// Fit a fresh scaler on the single request sample, then transform it.
    ///
    /// With one sample the variance is zero, so the output is always the
    /// zero vector. Kept only for parity with the calculator's historical
    /// outputs.
    PerSample,
}

impl FeatureScaling {
    /// Scale one sample, failing on any non-finite result.
    pub fn apply(&self, features: &FeatureVector) -> Result<[f64; FEATURE_COUNT]> {
        let scaled = match self {
            FeatureScaling::Fitted(params) => params.transform(features)?,
            FeatureScaling::PerSample => {
                ScalerParams::fit(std::slice::from_ref(features))?.transform(features)?
            }
        };

        if let Some(idx) = scaled.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::Inference(format!(
                "scaled feature {} is not finite ({})",
                idx, scaled[idx]
            )));
        }

        Ok(scaled)
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            FeatureScaling::Fitted(_) => "fitted",
            FeatureScaling::PerSample => "per_sample",
        }
    }
}
