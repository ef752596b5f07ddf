//! On-disk artifact formats and file loading.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use super::{Classifier, DenseNetwork, LogisticRegression, RandomForest, StandardScaler};
use crate::error::{InferenceError, LoadError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Logistic(LogisticRegression),
    Forest(RandomForest),
    Mlp(DenseNetwork),
}

impl Estimator {
    pub fn input_dim(&self) -> usize {
        match self {
            Self::Logistic(m) => m.input_dim(),
            Self::Forest(m) => m.input_dim,
            Self::Mlp(m) => m.input_dim,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::Logistic(m) => m.validate(),
            Self::Forest(m) => m.validate(),
            Self::Mlp(m) => m.validate(),
        }
    }
}

/// A serialized classifier plus the feature order it was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub estimator: Estimator,
    /// Free-form training metadata (versioning, metrics, etc).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ModelArtifact {
    /// Fill widths the format lets artifacts omit, then validate. Called after deserializing.
    pub fn finish(&mut self) -> Result<(), String> {
        if let Estimator::Forest(forest) = &mut self.estimator {
            forest.resolve_input_dim(self.feature_names.as_ref().map(Vec::len));
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.estimator.validate()?;
        if let Some(names) = &self.feature_names {
            if names.len() != self.estimator.input_dim() {
                return Err(format!(
                    "{} feature names for an estimator with input_dim {}",
                    names.len(),
                    self.estimator.input_dim()
                ));
            }
        }
        Ok(())
    }
}

impl Classifier for ModelArtifact {
    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        match &self.estimator {
            Estimator::Logistic(m) => m.predict_proba(features),
            Estimator::Forest(m) => m.predict_proba(features),
            Estimator::Mlp(m) => m.predict_proba(features),
        }
    }
}

/// File contents plus their hex SHA-256.
pub struct ArtifactBytes {
    pub bytes: Vec<u8>,
    pub sha256: String,
}

pub fn read_artifact(path: &Path) -> Result<ArtifactBytes, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            LoadError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        }
    })?;
    let sha256 = hex::encode(Sha256::digest(&bytes));
    Ok(ArtifactBytes { bytes, sha256 })
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, LoadError> {
    serde_json::from_slice(bytes).map_err(|e| LoadError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn invalid(path: &Path, reason: String) -> LoadError {
    LoadError::Invalid {
        path: path.display().to_string(),
        reason,
    }
}

pub fn load_model_json(path: &Path) -> Result<(ModelArtifact, String), LoadError> {
    let file = read_artifact(path)?;
    let mut model: ModelArtifact = parse_json(path, &file.bytes)?;
    model.finish().map_err(|reason| invalid(path, reason))?;
    Ok((model, file.sha256))
}

pub fn load_scaler_json(path: &Path) -> Result<(StandardScaler, String), LoadError> {
    let file = read_artifact(path)?;
    let mut scaler: StandardScaler = parse_json(path, &file.bytes)?;
    scaler.finish().map_err(|reason| invalid(path, reason))?;
    Ok((scaler, file.sha256))
}

/// Sidecar metadata for binary model formats that cannot carry feature names.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMeta {
    pub feature_names: Vec<String>,
}

pub fn load_model_meta(path: &Path) -> Result<ModelMeta, LoadError> {
    let file = read_artifact(path)?;
    let meta: ModelMeta = parse_json(path, &file.bytes)?;
    if meta.feature_names.is_empty() {
        return Err(invalid(path, "feature_names must not be empty".to_string()));
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logistic_artifact() {
        let json = r#"{
            "feature_names": ["age", "bmi"],
            "estimator": {"kind": "logistic", "coefficients": [0.5, -0.25], "intercept": 0.1}
        }"#;
        let model: ModelArtifact = serde_json::from_str(json).unwrap();
        model.validate().unwrap();
        assert_eq!(
            model.feature_names(),
            Some(&["age".to_string(), "bmi".to_string()][..])
        );
        let [p0, p1] = model.predict_proba(&[0.0, 0.0]).unwrap();
        assert!((p0 + p1 - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_feature_names_must_match_width() {
        let json = r#"{
            "feature_names": ["age"],
            "estimator": {"kind": "logistic", "coefficients": [0.5, -0.25]}
        }"#;
        let model: ModelArtifact = serde_json::from_str(json).unwrap();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_forest_artifact_without_input_dim_loads() {
        let path = std::env::temp_dir().join(format!("bodyecho-forest-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{
                "feature_names": ["age", "bmi"],
                "estimator": {"kind": "forest", "trees": [{"nodes": [
                    {"type": "split", "feature": 0, "threshold": 50.0, "left": 1, "right": 2},
                    {"type": "leaf", "value": [3.0, 1.0]},
                    {"type": "leaf", "value": [1.0, 3.0]}
                ]}]}
            }"#,
        )
        .unwrap();
        let loaded = load_model_json(&path);
        std::fs::remove_file(&path).ok();

        let (model, _) = loaded.unwrap();
        assert_eq!(model.estimator.input_dim(), 2);
        assert_eq!(model.predict_proba(&[40.0, 22.0]).unwrap(), [0.75, 0.25]);
        assert_eq!(model.predict(&[61.0, 22.0]).unwrap(), 1);
    }

    #[test]
    fn test_forest_split_beyond_feature_names_is_invalid() {
        let mut model: ModelArtifact = serde_json::from_str(
            r#"{
                "feature_names": ["age"],
                "estimator": {"kind": "forest", "trees": [{"nodes": [
                    {"type": "split", "feature": 3, "threshold": 0.0, "left": 1, "right": 2},
                    {"type": "leaf", "value": [1.0, 0.0]},
                    {"type": "leaf", "value": [0.0, 1.0]}
                ]}]}
            }"#,
        )
        .unwrap();
        assert!(model.finish().is_err());
    }

    #[test]
    fn test_parse_mlp_artifact() {
        let mut model: ModelArtifact = serde_json::from_str(
            r#"{
                "feature_names": ["age", "bmi"],
                "estimator": {"kind": "mlp", "input_dim": 2, "layers": [
                    {"weights": [[1.0, 0.0], [0.0, 1.0]], "bias": [0.0, 0.0], "activation": "relu"},
                    {"weights": [[1.0, -1.0]], "bias": [0.0], "activation": "sigmoid"}
                ]},
                "metadata": {"version": 3}
            }"#,
        )
        .unwrap();
        model.finish().unwrap();
        let [p0, p1] = model.predict_proba(&[0.0, 0.0]).unwrap();
        assert!((p0 - 0.5).abs() < 1e-12 && (p1 - 0.5).abs() < 1e-12);
        assert_eq!(model.predict(&[0.0, 2.0]).unwrap(), 0);
        assert_eq!(model.metadata["version"], 3);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = std::env::temp_dir().join(format!("bodyecho-missing-{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(
            load_model_json(&path),
            Err(LoadError::NotFound { .. })
        ));
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        let path = std::env::temp_dir().join(format!("bodyecho-digest-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"abc").unwrap();
        let file = read_artifact(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(
            file.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
