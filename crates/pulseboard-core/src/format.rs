//! Display helpers shared by every dashboard front end.

use serde::Serialize;

use crate::analytics::ComparisonResult;
use crate::metrics::MetricsSnapshot;

/// Seconds as `M:SS`. Minutes are unbounded; fractional seconds are dropped.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Whether a change is good news. For metrics where lower is better (bounce
/// rate) pass `invert`.
pub fn is_improvement(change: f64, invert: bool) -> bool {
    if invert {
        change < 0.0
    } else {
        change > 0.0
    }
}

/// Magnitude of a change badge, e.g. `20.0%`.
pub fn format_change(change: f64) -> String {
    format!("{:.1}%", change.abs())
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// One headline tile: a formatted value and its change badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    pub key: &'static str,
    pub title: &'static str,
    pub value: String,
    pub change: f64,
    pub change_label: String,
    pub improvement: bool,
    pub direction: Direction,
}

impl MetricCard {
    fn new(key: &'static str, title: &'static str, value: String, change: f64, invert: bool) -> Self {
        let improvement = is_improvement(change, invert);
        Self {
            key,
            title,
            value,
            change,
            change_label: format_change(change),
            improvement,
            direction: if improvement {
                Direction::Up
            } else {
                Direction::Down
            },
        }
    }
}

/// The four headline cards in dashboard order.
pub fn metric_cards(snapshot: &MetricsSnapshot, comparison: &ComparisonResult) -> Vec<MetricCard> {
    let m = &snapshot.metrics;
    vec![
        MetricCard::new(
            "users",
            "Total Users",
            m.total_users.to_string(),
            comparison.users,
            false,
        ),
        MetricCard::new(
            "sessions",
            "Sessions",
            m.sessions.to_string(),
            comparison.sessions,
            false,
        ),
        MetricCard::new(
            "bounceRate",
            "Bounce Rate",
            format_rate(m.bounce_rate),
            comparison.bounce_rate,
            true,
        ),
        MetricCard::new(
            "duration",
            "Avg. Duration",
            format_duration(m.avg_session_duration),
            comparison.duration,
            false,
        ),
    ]
}
