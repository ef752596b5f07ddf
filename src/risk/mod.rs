//! Feature alignment and multi-model risk inference.
//!
//! raw JSON → [`derive`] → [`reconcile`] → per category: [`project`] → model.

pub mod category;
pub mod derive;
pub mod input;
pub mod project;
pub mod reconcile;
pub mod runner;
pub mod schema;

pub use category::RiskCategory;
pub use derive::{derive, DerivedFeatures};
pub use input::RawInput;
pub use project::{project, ModelRow};
pub use reconcile::reconcile;
pub use runner::{CategoryOutcome, InferenceRunner, Prediction, RiskLevel, RiskReport};
pub use schema::{Column, FeatureRow};

use crate::error::Result;
use crate::ml::ModelRegistry;

/// Full pipeline for one request body.
///
/// Only a malformed body fails the call; per-category problems are reported
/// inside the returned map.
pub fn assess(registry: &ModelRegistry, body: &[u8]) -> Result<RiskReport> {
    let raw = RawInput::from_slice(body)?;
    registry.ensure_loaded();
    let row = reconcile(&raw, &derive(&raw));
    Ok(InferenceRunner::new(registry).run_all(&row))
}
