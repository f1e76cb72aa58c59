use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};

use pulseboard_core::analytics::{MetricsProvider, MetricsRequest};
use pulseboard_core::metrics::{CategoryShare, MetricsSnapshot, PageViewPoint, ScalarMetrics, TopPage};
use pulseboard_core::period::{DateRange, ReportingPeriod};

#[derive(Debug, Clone)]
enum Entry {
    Snapshot(MetricsSnapshot),
    Failure(String),
}

/// In-memory provider answering from a fixed table keyed by date range.
///
/// Serves demo mode and tests. Requests for a period are looked up by that
/// period's current window.
#[derive(Debug, Clone, Default)]
pub struct StaticMetricsProvider {
    entries: HashMap<DateRange, Entry>,
    delays: HashMap<DateRange, Duration>,
}

impl StaticMetricsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, range: DateRange, snapshot: MetricsSnapshot) -> Self {
        self.entries.insert(range, Entry::Snapshot(snapshot));
        self
    }

    pub fn with_failure(mut self, range: DateRange, message: impl Into<String>) -> Self {
        self.entries.insert(range, Entry::Failure(message.into()));
        self
    }

    /// Hold responses for `range` for `delay` before answering.
    pub fn with_delay(mut self, range: DateRange, delay: Duration) -> Self {
        self.delays.insert(range, delay);
        self
    }

    /// Sample data for every period's current and previous window.
    pub fn demo() -> Self {
        ReportingPeriod::ALL
            .iter()
            .enumerate()
            .fold(Self::new(), |provider, (i, period)| {
                let scale = [1, 4, 12, 48][i];
                provider
                    .with_snapshot(period.current_range(), demo_snapshot(scale, 0))
                    .with_snapshot(period.previous_range(), demo_snapshot(scale, 1))
            })
    }
}

fn demo_snapshot(scale: u64, generation: u64) -> MetricsSnapshot {
    // Older windows are a little smaller and bouncier.
    let users = 1_240 * scale - 130 * scale * generation;
    let sessions = 2_310 * scale - 190 * scale * generation;
    let bounce_rate = 42.5 + 3.5 * generation as f64;
    let avg_session_duration = 187.0 - 22.0 * generation as f64;

    let page_views = (1..=7)
        .map(|day| PageViewPoint {
            date: format!("Day {day}"),
            views: (380 + day * 35 - generation * 40) * scale,
        })
        .collect();
    let share = |name: &str, value: f64| CategoryShare {
        name: name.to_string(),
        value,
    };

    MetricsSnapshot {
        metrics: ScalarMetrics {
            total_users: users,
            sessions,
            bounce_rate,
            avg_session_duration,
        },
        page_views,
        demographics: vec![
            share("18-24", 22.0),
            share("25-34", 38.0),
            share("35-44", 24.0),
            share("45+", 16.0),
        ],
        devices: vec![
            share("Desktop", 54.0),
            share("Mobile", 39.0),
            share("Tablet", 7.0),
        ],
        top_pages: [("/", 41.0), ("/pricing", 64.5), ("/blog", 122.0), ("/docs", 95.2)]
            .iter()
            .enumerate()
            .map(|(rank, (path, time))| TopPage {
                path: path.to_string(),
                pageviews: (900 - 180 * rank as u64) * scale,
                avg_time_on_page: *time,
            })
            .collect(),
    }
}

#[async_trait::async_trait]
impl MetricsProvider for StaticMetricsProvider {
    async fn fetch_metrics(&self, request: &MetricsRequest) -> Result<MetricsSnapshot> {
        let range = request.date_range();
        if let Some(delay) = self.delays.get(&range) {
            tokio::time::sleep(*delay).await;
        }
        match self.entries.get(&range) {
            Some(Entry::Snapshot(snapshot)) => Ok(snapshot.clone()),
            Some(Entry::Failure(message)) => Err(anyhow!(message.clone())),
            None => Err(anyhow!("no metrics for range {range}")),
        }
    }
}
