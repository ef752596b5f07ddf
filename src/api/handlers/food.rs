use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::api::{state::AppState, types::*};

/// The JSON body's `query` wins over `?query=`.
fn resolve_query(body: &[u8], url_query: Option<FoodSearchQuery>) -> Option<String> {
    let from_body = serde_json::from_slice::<FoodSearchQuery>(body)
        .ok()
        .and_then(|q| q.query);
    from_body.or_else(|| url_query.and_then(|q| q.query))
}

/// GET|POST /search_food
pub async fn search_food_handler(
    State(state): State<AppState>,
    url_query: Option<Query<FoodSearchQuery>>,
    body: Bytes,
) -> Response {
    let query = resolve_query(&body, url_query.map(|Query(q)| q)).unwrap_or_default();

    match state.food_search.search(&query).await {
        Ok(data) => Json(FoodSearchResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => {
            warn!(query = %query, code = e.code(), error = %e, "Food search failed");
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(FoodSearchErrorResponse::from(&e))).into_response()
        }
    }
}
