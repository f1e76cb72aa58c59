//! Dashboard view state: the selected period and what is currently shown.
//!
//! Every selection or refresh takes a new generation number before it starts
//! fetching. When the fetch settles its outcome is applied only if no newer
//! request has started in the meantime, so the view always ends up showing the
//! most recently requested period.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pulseboard_core::analytics::{fetch_comparison, ComparisonReport, MetricsProvider};
use pulseboard_core::period::ReportingPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub selected_period: ReportingPeriod,
    pub status: ViewStatus,
    /// Message of the last failed fetch, shown instead of the data.
    pub error: Option<String>,
    pub report: Option<ComparisonReport>,
    pub generation: u64,
}

/// Whether a finished fetch made it into the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Superseded,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

pub struct DashboardState {
    view: Mutex<DashboardView>,
}

impl DashboardState {
    pub fn new(initial: ReportingPeriod) -> Self {
        Self {
            view: Mutex::new(DashboardView {
                selected_period: initial,
                status: ViewStatus::Idle,
                error: None,
                report: None,
                generation: 0,
            }),
        }
    }

    pub async fn snapshot(&self) -> DashboardView {
        self.view.lock().await.clone()
    }

    /// Switch to `period` and load it.
    pub async fn select_period(
        &self,
        provider: &dyn MetricsProvider,
        period: ReportingPeriod,
    ) -> Outcome {
        let (generation, period) = self.begin(Some(period)).await;
        self.load(provider, generation, period).await
    }

    /// Reload the currently selected period.
    pub async fn refresh(&self, provider: &dyn MetricsProvider) -> Outcome {
        let (generation, period) = self.begin(None).await;
        self.load(provider, generation, period).await
    }

    async fn begin(&self, period: Option<ReportingPeriod>) -> (u64, ReportingPeriod) {
        let mut view = self.view.lock().await;
        if let Some(period) = period {
            view.selected_period = period;
        }
        view.generation += 1;
        view.status = ViewStatus::Loading;
        view.error = None;
        (view.generation, view.selected_period)
    }

    async fn load(
        &self,
        provider: &dyn MetricsProvider,
        generation: u64,
        period: ReportingPeriod,
    ) -> Outcome {
        // The lock is not held while the provider is working.
        let result = fetch_comparison(provider, period).await;

        let mut view = self.view.lock().await;
        if view.generation != generation {
            debug!(
                %period,
                generation,
                latest = view.generation,
                "Discarding superseded dashboard result"
            );
            return Outcome::Superseded;
        }

        match result {
            Ok(report) => {
                info!(%period, generation, "Dashboard updated");
                view.status = ViewStatus::Ready;
                view.error = None;
                view.report = Some(report);
            }
            Err(err) => {
                warn!(%period, generation, error = %err, "Dashboard fetch failed");
                view.status = ViewStatus::Error;
                view.error = Some(err.message);
                view.report = None;
            }
        }
        Outcome::Applied
    }
}
