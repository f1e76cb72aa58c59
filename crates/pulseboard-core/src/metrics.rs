//! Metrics returned by an analytics provider for one window.

use serde::{Deserialize, Serialize};

/// Headline scalar metrics for one window.
///
/// A metric the provider leaves out decodes as `0`, which the comparison
/// treats as "no baseline".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScalarMetrics {
    pub total_users: u64,
    pub sessions: u64,
    /// Share of single-page sessions, 0-100.
    pub bounce_rate: f64,
    /// Mean session length in seconds.
    pub avg_session_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageViewPoint {
    pub date: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPage {
    pub path: String,
    pub pageviews: u64,
    pub avg_time_on_page: f64,
}

/// Everything the dashboard shows for one window. Replaced wholesale on every
/// fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub metrics: ScalarMetrics,
    /// Chronological.
    #[serde(default)]
    pub page_views: Vec<PageViewPoint>,
    #[serde(default)]
    pub demographics: Vec<CategoryShare>,
    #[serde(default)]
    pub devices: Vec<CategoryShare>,
    /// Provider ranking order.
    #[serde(default)]
    pub top_pages: Vec<TopPage>,
}

impl MetricsSnapshot {
    /// Snapshot carrying only the scalar metrics.
    pub fn from_metrics(metrics: ScalarMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }
}
