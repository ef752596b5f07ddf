use serde::{Deserialize, Serialize};

use super::{check_feature_count, sigmoid};
use crate::error::InferenceError;

/// Binary logistic regression: `P1 = sigmoid(w·x + b)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn input_dim(&self) -> usize {
        self.coefficients.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("coefficients must not be empty".to_string());
        }
        if self.coefficients.iter().any(|v| !v.is_finite()) || !self.intercept.is_finite() {
            return Err("coefficients and intercept must be finite".to_string());
        }
        Ok(())
    }

    pub fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        check_feature_count(features.len(), self.input_dim())?;
        let z = self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x);
        let p1 = sigmoid(z);
        Ok([1.0 - p1, p1])
    }
}
