//! Inference artifacts (deploy-safe, CPU-only).
//!
//! Models and scalers are loaded from a JSON exchange format so the service
//! runs without a Python toolchain. ONNX models are supported behind the
//! `onnx` feature.

pub mod artifact;
pub mod dense;
pub mod forest;
pub mod linear;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod registry;
pub mod scaler;

use crate::error::{InferenceError, ScaleError};

pub use artifact::{Estimator, ModelArtifact};
pub use dense::{Activation, DenseLayer, DenseNetwork};
pub use forest::{RandomForest, TreeNode};
pub use linear::LogisticRegression;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use registry::{ArtifactLoader, FsArtifactLoader, ModelBundle, ModelRegistry, ModelStatus};
pub use scaler::StandardScaler;

/// A fitted binary classifier.
pub trait Classifier: Send + Sync {
    /// Trained feature order, when the artifact recorded it.
    fn feature_names(&self) -> Option<&[String]>;

    /// `[P(class=0), P(class=1)]` for one row.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// Class label for one row; ties go to class 0.
    fn predict(&self, features: &[f64]) -> Result<u8, InferenceError> {
        let [p0, p1] = self.predict_proba(features)?;
        Ok(u8::from(p1 > p0))
    }
}

/// A fitted column-wise scaler.
pub trait Scaler: Send + Sync {
    /// Columns the scaler was fit on.
    fn feature_names(&self) -> &[String];

    /// Transform `values` of the named `columns`; output keeps input order.
    fn transform(&self, columns: &[&str], values: &[f64]) -> Result<Vec<f64>, ScaleError>;
}

/// Numerically-stable sigmoid.
pub(crate) fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

pub(crate) fn check_feature_count(got: usize, expected: usize) -> Result<(), InferenceError> {
    if got != expected {
        return Err(InferenceError::FeatureCount { got, expected });
    }
    Ok(())
}
