use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use pulseboard_core::analytics::MetricsProvider;
use pulseboard_provider::{HttpMetricsProvider, StaticMetricsProvider};
use pulseboard_server::config::{Config, ProviderMode};
use pulseboard_server::state::AppState;

/// `pulseboard health` - liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$PULSEBOARD_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("PULSEBOARD_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

fn build_provider(cfg: &Config) -> Result<Arc<dyn MetricsProvider>> {
    let provider: Arc<dyn MetricsProvider> = match &cfg.provider {
        ProviderMode::Demo => {
            tracing::warn!("Demo provider enabled, serving built-in sample metrics");
            Arc::new(StaticMetricsProvider::demo())
        }
        ProviderMode::Http(http) => {
            info!(
                base_url = %http.base_url,
                timeout_secs = http.timeout_secs,
                "Using HTTP metrics provider"
            );
            Arc::new(HttpMetricsProvider::new(http.clone())?)
        }
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulseboard=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let provider = build_provider(&cfg)?;
    let state = Arc::new(AppState::new(provider, cfg.clone()));

    // Mirror the dashboard opening on its default period.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            state.load_initial_view().await;
        });
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = pulseboard_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, default_period = %cfg.default_period, "Pulseboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
