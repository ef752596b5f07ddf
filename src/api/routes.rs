use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

/// Browser clients call the food proxy directly; preflights answer 204.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_preflight = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration (food proxy only)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let food = Router::new()
        .route(
            "/search_food",
            get(handlers::search_food_handler).post(handlers::search_food_handler),
        )
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content));

    Router::new()
        // Risk inference
        .route("/predict", post(handlers::predict_handler))
        // System endpoints
        .route("/health", get(handlers::health_handler))
        .merge(food)
        .with_state(state)
}
