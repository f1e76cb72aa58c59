use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{config::ProviderMode, error::AppError, state::AppState};

/// `GET /health` - liveness check.
///
/// Does not call the metrics provider; provider outages surface on the data
/// routes instead.
///
/// Response shape:
/// ```json
/// { "status": "ok", "version": "0.1.0", "provider": "http" }
/// ```
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let provider = match state.config.provider {
        ProviderMode::Demo => "demo",
        ProviderMode::Http(_) => "http",
    };
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "provider": provider,
        })),
    )
}

/// Fallback for unknown paths, so clients always get the JSON error shape.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
