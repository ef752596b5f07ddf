use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::category::RiskCategory;
use super::project::project;
use super::schema::FeatureRow;
use crate::error::{CategoryError, InferenceError};
use crate::ml::{ModelBundle, ModelRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: u8,
    /// P(class = 1)
    pub probability: f64,
    pub risk_level: RiskLevel,
}

/// Per-category outcome; serializes as either the prediction or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOutcome(pub Result<Prediction, CategoryError>);

impl Serialize for CategoryOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            error: &'a str,
        }

        match &self.0 {
            Ok(prediction) => prediction.serialize(serializer),
            Err(e) => ErrorBody {
                error: &e.to_string(),
            }
            .serialize(serializer),
        }
    }
}

pub type RiskReport = BTreeMap<RiskCategory, CategoryOutcome>;

pub struct InferenceRunner<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> InferenceRunner<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Score every category against one row. Always returns one entry per
    /// category; a failure in one never affects the others.
    pub fn run_all(&self, row: &FeatureRow) -> RiskReport {
        RiskCategory::ALL
            .into_iter()
            .map(|category| {
                let outcome = match self.registry.get(category) {
                    Some(bundle) => score(&bundle, category, row),
                    None => Err(CategoryError::NotLoaded),
                };
                match &outcome {
                    Ok(p) => debug!(
                        %category,
                        prediction = p.prediction,
                        probability = p.probability,
                        "Scored category"
                    ),
                    Err(CategoryError::NotLoaded) => {}
                    Err(e) => warn!(%category, error = %e, "Category scoring failed"),
                }
                (category, CategoryOutcome(outcome))
            })
            .collect()
    }
}

fn score(
    bundle: &ModelBundle,
    category: RiskCategory,
    row: &FeatureRow,
) -> Result<Prediction, CategoryError> {
    let model_row = project(
        row,
        category,
        bundle.scaler.as_ref(),
        bundle.classifier.feature_names(),
    )?;

    let label = bundle.classifier.predict(model_row.values())?;
    let [_, p1] = bundle.classifier.predict_proba(model_row.values())?;

    if label > 1 {
        return Err(InferenceError::InvalidLabel(label.to_string()).into());
    }
    if !(0.0..=1.0).contains(&p1) {
        return Err(InferenceError::InvalidProbability(p1.to_string()).into());
    }

    Ok(Prediction {
        prediction: label,
        probability: p1,
        risk_level: if label == 1 {
            RiskLevel::High
        } else {
            RiskLevel::Low
        },
    })
}
