use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use pulseboard_core::analytics::{fetch_comparison, ComparisonReport};
use pulseboard_core::format::{metric_cards, MetricCard};
use pulseboard_core::period::{previous_range_for_label, ReportingPeriod};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

/// A comparison report as the dashboard renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub label: &'static str,
    #[serde(flatten)]
    pub report: ComparisonReport,
    pub cards: Vec<MetricCard>,
}

impl ComparisonView {
    pub fn new(report: ComparisonReport) -> Self {
        Self {
            label: report.period.display_name(),
            cards: metric_cards(&report.snapshot, &report.comparison),
            report,
        }
    }
}

pub fn parse_period(raw: Option<&str>) -> Result<ReportingPeriod, AppError> {
    ReportingPeriod::parse(raw).map_err(|err| AppError::BadRequest(err.to_string()))
}

/// `GET /api/comparison?period=last7Days` - Current metrics with their change
/// against the previous window.
#[tracing::instrument(skip(state))]
pub async fn get_comparison(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period = parse_period(query.period.as_deref())?;
    let report = fetch_comparison(state.provider.as_ref(), period).await?;

    Ok(Json(json!({ "data": ComparisonView::new(report) })))
}

/// `GET /api/comparison/previous-range?period=...` - The comparison window for
/// a period label. Unknown labels resolve to the `last7Days` window.
pub async fn get_previous_range(Query(query): Query<PeriodQuery>) -> impl IntoResponse {
    let requested = query.period.unwrap_or_default();
    let range = previous_range_for_label(&requested);

    Json(json!({
        "data": {
            "requested": requested,
            "previousRange": range,
        }
    }))
}
