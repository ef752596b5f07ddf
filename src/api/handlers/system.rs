use axum::{extract::State, Json};

use crate::api::{state::AppState, types::*};
use crate::ml::ModelStatus;

/// GET /health -- liveness probe with per-category model state
///
/// Always 200; a category whose artifacts failed to load turns the status to
/// `degraded` without taking the service down.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state.registry.statuses();
    let degraded = models
        .values()
        .any(|s| matches!(s, ModelStatus::Failed { .. }));

    Json(HealthResponse {
        status: if degraded {
            "degraded".to_string()
        } else {
            "ok".to_string()
        },
        uptime_secs: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION"),
        models,
    })
}
