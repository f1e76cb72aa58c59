use std::sync::Arc;

use pulseboard_core::analytics::MetricsProvider;

use crate::{config::Config, dashboard::DashboardState};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// External analytics source. Stateless, so handlers share it freely.
    pub provider: Arc<dyn MetricsProvider>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Selected period and last applied comparison for the dashboard view.
    pub dashboard: DashboardState,
}

impl AppState {
    pub fn new(provider: Arc<dyn MetricsProvider>, config: Config) -> Self {
        let dashboard = DashboardState::new(config.default_period);
        Self {
            provider,
            config: Arc::new(config),
            dashboard,
        }
    }

    /// Load the default period so the first dashboard read has data.
    pub async fn load_initial_view(&self) {
        let outcome = self.dashboard.refresh(self.provider.as_ref()).await;
        tracing::debug!(?outcome, "Initial dashboard load finished");
    }
}
