use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `CorsLayer` - the dashboard front end is usually served from another
///    origin. `PULSEBOARD_CORS_ORIGINS` narrows it; empty means any origin.
/// 2. `TraceLayer` - structured request/response logging via `tracing`.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(&state.config.cors_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/periods", get(routes::periods::list_periods))
        .route("/api/comparison", get(routes::comparison::get_comparison))
        .route(
            "/api/comparison/previous-range",
            get(routes::comparison::get_previous_range),
        )
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        .route(
            "/api/dashboard/period",
            put(routes::dashboard::select_period),
        )
        .route("/api/dashboard/refresh", post(routes::dashboard::refresh))
        .fallback(routes::health::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn allow_origin(origins: &[String]) -> AllowOrigin {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if parsed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parsed)
    }
}
