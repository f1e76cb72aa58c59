use axum::{response::IntoResponse, Json};
use serde_json::json;

use pulseboard_core::period::ReportingPeriod;

/// `GET /api/periods` - Selectable periods with their windows.
pub async fn list_periods() -> impl IntoResponse {
    let periods: Vec<_> = ReportingPeriod::ALL
        .iter()
        .map(|period| {
            json!({
                "period": period,
                "label": period.display_name(),
                "currentRange": period.current_range(),
                "previousRange": period.previous_range(),
            })
        })
        .collect();

    Json(json!({ "data": periods }))
}
