use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::api::{state::AppState, types::*};
use crate::error::BodyEchoError;
use crate::risk;

/// POST /predict
pub async fn predict_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = Uuid::new_v4();
    respond(state, body)
        .instrument(info_span!("predict", %request_id))
        .await
}

async fn respond(
    state: AppState,
    body: Bytes,
) -> std::result::Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let registry = Arc::clone(&state.registry);
    let span = Span::current();
    let outcome =
        tokio::task::spawn_blocking(move || span.in_scope(|| risk::assess(&registry, &body)))
            .await;

    match outcome {
        Ok(Ok(results)) => {
            let failed = results.values().filter(|o| o.0.is_err()).count();
            info!(categories = results.len(), failed, "Prediction complete");
            Ok(Json(PredictResponse::new(results)))
        }
        Ok(Err(e @ BodyEchoError::Request(_))) => {
            warn!(error = %e, "Rejected prediction request");
            Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))))
        }
        Ok(Err(e)) => {
            error!(error = %e, "Prediction failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
        Err(join_err) => {
            error!(error = %join_err, "Prediction task aborted");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("prediction task failed")),
            ))
        }
    }
}
