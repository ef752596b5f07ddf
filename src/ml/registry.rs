//! Process-wide cache of (model, scaler) pairs, one slot per risk category.
//!
//! Each slot resolves at most once: the first caller loads, concurrent
//! callers block on the same `OnceLock` and then observe the settled result.
//! Failures settle too and are never retried.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use super::artifact::{load_model_json, load_scaler_json};
use super::{Classifier, Scaler};
use crate::error::LoadError;
use crate::risk::RiskCategory;

/// Everything needed to score one category.
pub struct ModelBundle {
    pub classifier: Box<dyn Classifier>,
    pub scaler: Box<dyn Scaler>,
    pub model_sha256: String,
    pub scaler_sha256: String,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("model_sha256", &self.model_sha256)
            .field("scaler_sha256", &self.scaler_sha256)
            .finish()
    }
}

/// Storage backend for category artifacts.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactLoader: Send + Sync {
    fn load(&self, category: RiskCategory) -> Result<ModelBundle, LoadError>;

    /// Where artifacts come from, for logs.
    fn describe(&self) -> String;
}

/// Loads `<category>_model.json` and `scaler_for_<category>_model.json`
/// from one directory. With the `onnx` feature, `<category>_model.onnx`
/// plus `<category>_model.meta.json` is used when no JSON model exists.
#[derive(Debug, Clone)]
pub struct FsArtifactLoader {
    dir: PathBuf,
}

impl FsArtifactLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_classifier(
        &self,
        category: RiskCategory,
    ) -> Result<(Box<dyn Classifier>, String), LoadError> {
        let stem = category.model_file_stem();
        let json_path = self.dir.join(format!("{stem}.json"));

        match load_model_json(&json_path) {
            Ok((model, digest)) => Ok((Box::new(model), digest)),
            #[cfg(feature = "onnx")]
            Err(LoadError::NotFound { .. }) => {
                let meta =
                    super::artifact::load_model_meta(&self.dir.join(format!("{stem}.meta.json")))?;
                let (model, digest) = super::OnnxClassifier::load(
                    &self.dir.join(format!("{stem}.onnx")),
                    meta.feature_names,
                )?;
                Ok((Box::new(model), digest))
            }
            Err(e) => Err(e),
        }
    }
}

impl ArtifactLoader for FsArtifactLoader {
    fn load(&self, category: RiskCategory) -> Result<ModelBundle, LoadError> {
        let (classifier, model_sha256) = self.load_classifier(category)?;
        let scaler_path = self
            .dir
            .join(format!("{}.json", category.scaler_file_stem()));
        let (scaler, scaler_sha256) = load_scaler_json(&scaler_path)?;

        Ok(ModelBundle {
            classifier,
            scaler: Box::new(scaler),
            model_sha256,
            scaler_sha256,
        })
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

type Slot = OnceLock<Result<Arc<ModelBundle>, LoadError>>;

/// Load state of one category, as reported by health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelStatus {
    Pending,
    Loaded {
        model_sha256: String,
        scaler_sha256: String,
    },
    Failed {
        error: String,
    },
}

pub struct ModelRegistry {
    loader: Box<dyn ArtifactLoader>,
    slots: BTreeMap<RiskCategory, Slot>,
}

impl ModelRegistry {
    pub fn new(loader: impl ArtifactLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            slots: RiskCategory::ALL
                .into_iter()
                .map(|c| (c, OnceLock::new()))
                .collect(),
        }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(FsArtifactLoader::new(dir))
    }

    fn slot(&self, category: RiskCategory) -> &Slot {
        // Slots are created for every category in `new`.
        &self.slots[&category]
    }

    fn resolve(&self, category: RiskCategory) -> &Result<Arc<ModelBundle>, LoadError> {
        self.slot(category).get_or_init(|| {
            match self.loader.load(category) {
                Ok(bundle) => {
                    info!(
                        %category,
                        model_sha256 = %bundle.model_sha256,
                        scaler_sha256 = %bundle.scaler_sha256,
                        "Loaded model and scaler"
                    );
                    Ok(Arc::new(bundle))
                }
                Err(e) => {
                    warn!(
                        %category,
                        source = %self.loader.describe(),
                        error = %e,
                        "Failed to load model; category disabled for this process"
                    );
                    Err(e)
                }
            }
        })
    }

    /// Resolve every category. Already-settled slots are left alone.
    pub fn ensure_loaded(&self) {
        for category in RiskCategory::ALL {
            self.resolve(category);
        }
    }

    /// The loaded pair, if the slot settled successfully.
    pub fn get(&self, category: RiskCategory) -> Option<Arc<ModelBundle>> {
        match self.slot(category).get() {
            Some(Ok(bundle)) => Some(Arc::clone(bundle)),
            _ => None,
        }
    }

    pub fn status(&self, category: RiskCategory) -> ModelStatus {
        match self.slot(category).get() {
            None => ModelStatus::Pending,
            Some(Ok(bundle)) => ModelStatus::Loaded {
                model_sha256: bundle.model_sha256.clone(),
                scaler_sha256: bundle.scaler_sha256.clone(),
            },
            Some(Err(e)) => ModelStatus::Failed {
                error: e.to_string(),
            },
        }
    }

    pub fn statuses(&self) -> BTreeMap<RiskCategory, ModelStatus> {
        RiskCategory::ALL
            .into_iter()
            .map(|c| (c, self.status(c)))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ml::{Estimator, LogisticRegression, ModelArtifact, StandardScaler};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn constant_bundle(p1_logit: f64) -> ModelBundle {
        let model = ModelArtifact {
            feature_names: Some(vec!["age".into()]),
            estimator: Estimator::Logistic(LogisticRegression {
                coefficients: vec![0.0; 1],
                intercept: p1_logit,
            }),
            metadata: serde_json::Value::Null,
        };
        ModelBundle {
            classifier: Box::new(model),
            scaler: Box::new(StandardScaler::new(vec!["age".into()], vec![0.0], vec![1.0]).unwrap()),
            model_sha256: "model".into(),
            scaler_sha256: "scaler".into(),
        }
    }

    #[test]
    fn test_failed_category_is_isolated_and_permanent() {
        let mut loader = MockArtifactLoader::new();
        loader
            .expect_load()
            .times(6)
            .returning(|category| match category {
                RiskCategory::ObesityRisk => Err(LoadError::NotFound {
                    path: "models/obesity_risk_model.json".into(),
                }),
                _ => Ok(constant_bundle(0.0)),
            });
        loader.expect_describe().return_const("mock".to_string());

        let registry = ModelRegistry::new(loader);
        registry.ensure_loaded();
        registry.ensure_loaded();

        assert!(registry.get(RiskCategory::ObesityRisk).is_none());
        assert!(matches!(
            registry.status(RiskCategory::ObesityRisk),
            ModelStatus::Failed { .. }
        ));
        for category in RiskCategory::ALL {
            if category != RiskCategory::ObesityRisk {
                assert!(registry.get(category).is_some(), "{category}");
            }
        }
    }

    #[test]
    fn test_pending_until_loaded() {
        let mut loader = MockArtifactLoader::new();
        loader.expect_load().returning(|_| Ok(constant_bundle(0.0)));
        let registry = ModelRegistry::new(loader);
        assert_eq!(registry.status(RiskCategory::CancerRisk), ModelStatus::Pending);
        assert!(registry.get(RiskCategory::CancerRisk).is_none());
        registry.ensure_loaded();
        assert_eq!(
            registry.status(RiskCategory::CancerRisk),
            ModelStatus::Loaded {
                model_sha256: "model".into(),
                scaler_sha256: "scaler".into(),
            }
        );
    }

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
    }

    impl ArtifactLoader for CountingLoader {
        fn load(&self, _category: RiskCategory) -> Result<ModelBundle, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(constant_bundle(0.0))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn test_concurrent_first_access_loads_once_per_category() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(ModelRegistry::new(CountingLoader {
            calls: Arc::clone(&calls),
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.ensure_loaded();
                    RiskCategory::ALL
                        .into_iter()
                        .all(|c| registry.get(c).is_some())
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), RiskCategory::ALL.len());
    }

    #[test]
    fn test_fs_loader_reports_missing_directory() {
        let dir = std::env::temp_dir().join(format!("bodyecho-empty-{}", uuid::Uuid::new_v4()));
        let registry = ModelRegistry::from_dir(&dir);
        registry.ensure_loaded();
        for (category, status) in registry.statuses() {
            match status {
                ModelStatus::Failed { error } => {
                    assert!(error.contains(category.as_str()), "{error}")
                }
                other => panic!("{category}: unexpected {other:?}"),
            }
        }
    }
}
