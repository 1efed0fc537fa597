//! ONNX Runtime backed classifier

use crate::models::classifier::Classifier;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Class-1 probability at or above which the probability fallback yields category 1
const PROBABILITY_CUTOFF: f64 = 0.5;

/// Loaded ONNX classifier with its resolved input/output names
#[derive(Debug)]
pub struct OnnxClassifier {
    /// Model name
    name: String,
    /// ONNX Runtime session (`run` needs exclusive access)
    session: Mutex<Session>,
    /// Input name for the feature tensor
    input_name: String,
    /// Output carrying the predicted class, if the export has one
    label_output: Option<String>,
    /// Output carrying class probabilities
    probability_output: Option<String>,
}

impl OnnxClassifier {
    /// Wrap a committed session, discovering its input and output names.
    pub fn from_session(name: &str, session: Session) -> Self {
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.iter().find(|o| !o.name.contains("label")))
            .map(|o| o.name.clone());

        Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            label_output,
            probability_output,
        }
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn label_output(&self) -> Option<&str> {
        self.label_output.as_deref()
    }

    pub fn probability_output(&self) -> Option<&str> {
        self.probability_output.as_deref()
    }

    /// Read the category from the model outputs.
    ///
    /// Prefers the int64 label tensor; otherwise thresholds the class-1
    /// probability.
    fn extract_category(&self, outputs: &SessionOutputs) -> Result<i64> {
        let label = self.extract_label(outputs);
        let category = category_from_outputs(label, || self.extract_probability(outputs))?;
        debug!(
            model = %self.name,
            category = category,
            from_label = label.is_some(),
            "Extracted category"
        );
        Ok(category)
    }

    fn extract_label(&self, outputs: &SessionOutputs) -> Option<i64> {
        let output = outputs.get(self.label_output.as_deref()?)?;
        let (_, data) = output.try_extract_tensor::<i64>().ok()?;
        data.first().copied()
    }

    /// Extract the class-1 probability.
    /// Handles tensor outputs and seq(map) outputs (LightGBM, CatBoost exports)
    fn extract_probability(&self, outputs: &SessionOutputs) -> Result<f64> {
        let output_name = self
            .probability_output
            .as_deref()
            .context("model exposes neither a label nor a probability output")?;

        let output = outputs
            .get(output_name)
            .with_context(|| format!("output {:?} missing from inference result", output_name))?;

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return positive_class_from_tensor(&dims, data)
                .context("probability tensor is empty");
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return self.extract_from_sequence_map(output);
        }

        warn!(model = %self.name, output = %output_name, "Unsupported probability output type");
        anyhow::bail!("unsupported output type for {:?}", output_name)
    }

    /// Extract the class-1 probability from seq(map(int64, float))
    fn extract_from_sequence_map(&self, output: &DynValue) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
        let map_value = maps
            .first()
            .ok_or_else(|| anyhow::anyhow!("Empty probability sequence"))?;

        let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;
        positive_class_from_pairs(&kv_pairs).context("No probability found in map")
    }
}

/// Category from the label output if present, else from the class-1 probability
fn category_from_outputs<F>(label: Option<i64>, probability: F) -> Result<i64>
where
    F: FnOnce() -> Result<f64>,
{
    if let Some(category) = label {
        return Ok(category);
    }
    let probability = probability()?;
    Ok(if probability >= PROBABILITY_CUTOFF { 1 } else { 0 })
}

/// Lock a mutex even if a previous holder panicked.
///
/// An aborted inference run leaves nothing half-updated in the session, so
/// the poison flag carries no information here.
pub(crate) fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Class-1 probability from a `[batch, classes]` or `[classes]` tensor
fn positive_class_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let num_classes = dims.last().copied().unwrap_or(data.len() as i64);
    match num_classes {
        n if n >= 2 => data.get(1).map(|&p| p as f64),
        1 => data.first().map(|&p| p as f64),
        _ => data.last().map(|&p| p as f64),
    }
}

/// Class-1 probability from class-id/probability pairs
fn positive_class_from_pairs(pairs: &[(i64, f32)]) -> Option<f64> {
    pairs
        .iter()
        .find(|(class_id, _)| *class_id == 1)
        .map(|(_, p)| *p as f64)
        .or_else(|| {
            pairs
                .iter()
                .find(|(class_id, _)| *class_id == 0)
                .map(|(_, p)| 1.0 - *p as f64)
        })
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &[f64]) -> Result<i64> {
        let input: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let shape = vec![1_i64, input.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, input)).context("Failed to create input tensor")?;

        let mut session = lock_recovering(&self.session);

        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;
        self.extract_category(&outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_class_from_tensor() {
        assert_eq!(positive_class_from_tensor(&[1, 2], &[0.3, 0.7]), Some(0.7f32 as f64));
        assert_eq!(positive_class_from_tensor(&[2], &[0.9, 0.1]), Some(0.1f32 as f64));
        assert_eq!(positive_class_from_tensor(&[1, 1], &[0.4]), Some(0.4f32 as f64));
        assert_eq!(positive_class_from_tensor(&[1, 2], &[]), None);
    }

    #[test]
    fn test_label_preferred_over_probability() {
        let category = category_from_outputs(Some(1), || panic!("probability not needed")).unwrap();
        assert_eq!(category, 1);

        // Unexpected categories pass through untouched
        let category = category_from_outputs(Some(2), || Ok(0.9)).unwrap();
        assert_eq!(category, 2);
    }

    #[test]
    fn test_probability_fallback_without_label() {
        assert_eq!(category_from_outputs(None, || Ok(0.5)).unwrap(), 1);
        assert_eq!(category_from_outputs(None, || Ok(0.93)).unwrap(), 1);
        assert_eq!(category_from_outputs(None, || Ok(0.49)).unwrap(), 0);

        let err = category_from_outputs(None, || anyhow::bail!("no probability output"));
        assert!(err.is_err());
    }

    #[test]
    fn test_lock_recovering_after_panic() {
        let mutex = Mutex::new(0_u32);

        let result = std::panic::catch_unwind(|| {
            let mut guard = mutex.lock().unwrap();
            *guard += 1;
            panic!("inference aborted");
        });
        assert!(result.is_err());
        assert!(mutex.is_poisoned());

        let mut guard = lock_recovering(&mutex);
        *guard += 1;
        assert_eq!(*guard, 2);
    }

    #[test]
    fn test_positive_class_from_pairs() {
        assert_eq!(
            positive_class_from_pairs(&[(0, 0.25), (1, 0.75)]),
            Some(0.75)
        );
        assert_eq!(positive_class_from_pairs(&[(0, 0.25)]), Some(0.75));
        assert_eq!(positive_class_from_pairs(&[(3, 0.5)]), None);
    }
}
