//! ONNX classifier wrapper (pure Rust via `tract-onnx`).
//!
//! Expects a `[1, input_dim]` f32 input and a first output holding the two
//! class probabilities (sklearn-onnx export with zipmap disabled).

use std::path::Path;

use tract_onnx::prelude::*;

use super::artifact::read_artifact;
use super::{check_feature_count, Classifier};
use crate::error::{InferenceError, LoadError};

pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    feature_names: Vec<String>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_dim", &self.feature_names.len())
            .finish()
    }
}

impl OnnxClassifier {
    /// Load an ONNX model and specialize it to `[1, feature_names.len()]`.
    ///
    /// Returns the classifier and the hex SHA-256 of the model file.
    pub fn load(path: &Path, feature_names: Vec<String>) -> Result<(Self, String), LoadError> {
        let invalid = |reason: String| LoadError::Invalid {
            path: path.display().to_string(),
            reason,
        };
        if feature_names.is_empty() {
            return Err(invalid("feature_names must not be empty".to_string()));
        }

        let file = read_artifact(path)?;
        let model = tract_onnx::onnx()
            .model_for_read(&mut file.bytes.as_slice())
            .map_err(|e| LoadError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let plan = model
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, feature_names.len())),
            )
            .map_err(|e| invalid(format!("onnx input fact failed: {e}")))?
            .into_optimized()
            .map_err(|e| invalid(format!("onnx optimize failed: {e}")))?
            .into_runnable()
            .map_err(|e| invalid(format!("onnx runnable failed: {e}")))?;

        let classifier = Self {
            plan,
            feature_names,
        };

        // Dry run so a wrong output shape fails at load time, not per request.
        let zeros = vec![0.0; classifier.feature_names.len()];
        classifier
            .predict_proba(&zeros)
            .map_err(|e| invalid(format!("onnx dry run failed: {e}")))?;

        Ok((classifier, file.sha256))
    }
}

impl Classifier for OnnxClassifier {
    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        check_feature_count(features.len(), self.feature_names.len())?;
        let eval = |e: String| InferenceError::Evaluation(e);

        let input: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let tensor = tract_ndarray::Array2::<f32>::from_shape_vec((1, input.len()), input)
            .map_err(|e| eval(format!("onnx input reshape failed: {e}")))?
            .into_tvalue();

        let outputs = self
            .plan
            .run(tvec!(tensor))
            .map_err(|e| eval(format!("onnx run failed: {e}")))?;
        let Some(first) = outputs.first() else {
            return Err(eval("onnx produced no outputs".to_string()));
        };
        let arr = first
            .to_array_view::<f32>()
            .map_err(|e| eval(format!("onnx output decode failed: {e}")))?;

        match arr.iter().copied().collect::<Vec<f32>>().as_slice() {
            [p0, p1] => Ok([f64::from(*p0), f64::from(*p1)]),
            other => Err(eval(format!(
                "expected 2 class probabilities, got {}",
                other.len()
            ))),
        }
    }
}
