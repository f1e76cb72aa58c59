use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use pulseboard_core::format::{metric_cards, MetricCard};

use crate::{
    dashboard::{DashboardView, Outcome},
    error::AppError,
    routes::comparison::parse_period,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SelectPeriodRequest {
    pub period: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardPayload {
    label: &'static str,
    #[serde(flatten)]
    view: DashboardView,
    #[serde(skip_serializing_if = "Option::is_none")]
    cards: Option<Vec<MetricCard>>,
}

impl From<DashboardView> for DashboardPayload {
    fn from(view: DashboardView) -> Self {
        let cards = view
            .report
            .as_ref()
            .map(|report| metric_cards(&report.snapshot, &report.comparison));
        Self {
            label: view.selected_period.display_name(),
            view,
            cards,
        }
    }
}

async fn respond(state: &AppState, outcome: Option<Outcome>) -> impl IntoResponse {
    let payload = DashboardPayload::from(state.dashboard.snapshot().await);
    match outcome {
        Some(outcome) => Json(json!({ "data": payload, "applied": outcome.is_applied() })),
        None => Json(json!({ "data": payload })),
    }
}

/// `GET /api/dashboard` - What the dashboard currently shows.
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(&state, None).await
}

/// `PUT /api/dashboard/period` - Select a period and load it.
///
/// A fetch failure is part of the view (`status: "error"`), not an HTTP error.
/// `applied` is false when a newer request replaced this one while it ran.
pub async fn select_period(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectPeriodRequest>,
) -> Result<impl IntoResponse, AppError> {
    let period = parse_period(Some(req.period.as_str()))?;
    let outcome = state
        .dashboard
        .select_period(state.provider.as_ref(), period)
        .await;
    Ok(respond(&state, Some(outcome)).await)
}

/// `POST /api/dashboard/refresh` - Reload the selected period.
pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let outcome = state.dashboard.refresh(state.provider.as_ref()).await;
    respond(&state, Some(outcome)).await
}
