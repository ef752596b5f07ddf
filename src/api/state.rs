use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::food::FoodSearchClient;
use crate::ml::ModelRegistry;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Per-category model and scaler pairs
    pub registry: Arc<ModelRegistry>,

    /// FatSecret proxy client (may lack credentials)
    pub food_search: Arc<FoodSearchClient>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>, food_search: Arc<FoodSearchClient>) -> Self {
        Self {
            registry,
            food_search,
            start_time: Utc::now(),
        }
    }

    /// Build state from configuration. Models are not touched here.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = ModelRegistry::from_dir(&config.models.dir);
        let food_search = FoodSearchClient::new(&config.food_search)?;
        Ok(Self::new(Arc::new(registry), Arc::new(food_search)))
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
