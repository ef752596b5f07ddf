use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::FoodSearchError;
use crate::ml::ModelStatus;
use crate::risk::{RiskCategory, RiskReport};

// ============================================================================
// Prediction Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub results: RiskReport,
}

impl PredictResponse {
    pub fn new(results: RiskReport) -> Self {
        Self {
            success: true,
            results,
        }
    }
}

/// Whole-request failure; carries no per-category results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// ============================================================================
// Food Search Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct FoodSearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodSearchResponse {
    pub success: bool,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodSearchErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&FoodSearchError> for FoodSearchErrorResponse {
    fn from(err: &FoodSearchError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            error_code: err.code(),
            details: err.details().map(str::to_string),
        }
    }
}

// ============================================================================
// System Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: i64,
    pub version: &'static str,
    pub models: BTreeMap<RiskCategory, ModelStatus>,
}
