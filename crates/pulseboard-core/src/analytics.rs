//! Metrics provider abstraction and the period comparison engine.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DataFetchError;
use crate::metrics::MetricsSnapshot;
use crate::period::{resolve_previous_period, DateRange, ReportingPeriod};

/// What a provider is asked for: a named period (its current window) or an
/// explicit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricsRequest {
    Period(ReportingPeriod),
    Range(DateRange),
}

impl MetricsRequest {
    pub fn date_range(&self) -> DateRange {
        match self {
            Self::Period(period) => period.current_range(),
            Self::Range(range) => *range,
        }
    }
}

/// External analytics source. Calls must be idempotent and must not modify
/// provider-side data.
#[async_trait::async_trait]
pub trait MetricsProvider: Send + Sync + 'static {
    async fn fetch_metrics(&self, request: &MetricsRequest) -> anyhow::Result<MetricsSnapshot>;
}

/// Relative change per headline metric, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub users: f64,
    pub sessions: f64,
    pub bounce_rate: f64,
    pub duration: f64,
}

/// Current snapshot plus its change against the previous window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub period: ReportingPeriod,
    pub previous_range: DateRange,
    pub snapshot: MetricsSnapshot,
    pub comparison: ComparisonResult,
}

/// `(current - previous) / previous * 100`, or `0` when there is no baseline.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Per-metric change of `current` against `previous`. A metric missing from the
/// previous window decodes as `0` and so reports no change.
pub fn compare(current: &MetricsSnapshot, previous: &MetricsSnapshot) -> ComparisonResult {
    let (cur, prev) = (&current.metrics, &previous.metrics);
    ComparisonResult {
        users: percent_change(cur.total_users as f64, prev.total_users as f64),
        sessions: percent_change(cur.sessions as f64, prev.sessions as f64),
        bounce_rate: percent_change(cur.bounce_rate, prev.bounce_rate),
        duration: percent_change(cur.avg_session_duration, prev.avg_session_duration),
    }
}

/// Fetch `period` and its previous window concurrently and compare them.
///
/// Both requests must succeed; the first failure aborts the pair and is
/// returned as a single [`DataFetchError`].
pub async fn fetch_comparison(
    provider: &dyn MetricsProvider,
    period: ReportingPeriod,
) -> Result<ComparisonReport, DataFetchError> {
    let previous_range = resolve_previous_period(period);
    let current_request = MetricsRequest::Period(period);
    let previous_request = MetricsRequest::Range(previous_range);

    let (current, previous) = tokio::try_join!(
        provider.fetch_metrics(&current_request),
        provider.fetch_metrics(&previous_request),
    )
    .map_err(|err| {
        let err = DataFetchError::from(err);
        warn!(%period, error = %err, "Metrics fetch failed");
        err
    })?;

    let comparison = compare(&current, &previous);
    debug!(%period, %previous_range, ?comparison, "Comparison computed");

    Ok(ComparisonReport {
        period,
        previous_range,
        snapshot: current,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ScalarMetrics;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedProvider {
        responses: HashMap<DateRange, Result<MetricsSnapshot, String>>,
        calls: Mutex<Vec<MetricsRequest>>,
    }

    impl FixedProvider {
        fn new(
            current: Result<MetricsSnapshot, String>,
            previous: Result<MetricsSnapshot, String>,
            period: ReportingPeriod,
        ) -> Self {
            let mut responses = HashMap::new();
            responses.insert(period.current_range(), current);
            responses.insert(period.previous_range(), previous);
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl MetricsProvider for FixedProvider {
        async fn fetch_metrics(&self, request: &MetricsRequest) -> anyhow::Result<MetricsSnapshot> {
            self.calls.lock().expect("calls").push(*request);
            match self.responses.get(&request.date_range()) {
                Some(Ok(snapshot)) => Ok(snapshot.clone()),
                Some(Err(message)) => Err(anyhow::anyhow!(message.clone())),
                None => Err(anyhow::anyhow!("unexpected request")),
            }
        }
    }

    fn snapshot(users: u64, sessions: u64, bounce: f64, duration: f64) -> MetricsSnapshot {
        MetricsSnapshot::from_metrics(ScalarMetrics {
            total_users: users,
            sessions,
            bounce_rate: bounce,
            avg_session_duration: duration,
        })
    }

    #[test]
    fn percent_change_examples() {
        assert_eq!(percent_change(120.0, 100.0), 20.0);
        assert_eq!(percent_change(80.0, 100.0), -20.0);
        assert_eq!(percent_change(100.0, 100.0), 0.0);
    }

    #[test]
    fn zero_baseline_yields_zero() {
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(57.0, 0.0), 0.0);
        assert_eq!(percent_change(-3.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn fetch_comparison_computes_all_deltas() {
        let period = ReportingPeriod::Last30Days;
        let provider = FixedProvider::new(
            Ok(snapshot(150, 300, 40.0, 125.0)),
            Ok(snapshot(100, 250, 50.0, 100.0)),
            period,
        );

        let report = fetch_comparison(&provider, period).await.expect("report");
        assert_eq!(report.comparison.users, 50.0);
        assert_eq!(report.comparison.sessions, 20.0);
        assert_eq!(report.comparison.bounce_rate, -20.0);
        assert_eq!(report.comparison.duration, 25.0);
        assert_eq!(report.snapshot.metrics.total_users, 150);
        assert_eq!(report.previous_range, period.previous_range());

        let calls = provider.calls.lock().expect("calls");
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&MetricsRequest::Period(period)));
        assert!(calls.contains(&MetricsRequest::Range(period.previous_range())));
    }

    #[tokio::test]
    async fn previous_failure_fails_whole_comparison() {
        let period = ReportingPeriod::Last7Days;
        let provider = FixedProvider::new(
            Ok(snapshot(1, 1, 1.0, 1.0)),
            Err("quota exceeded".to_string()),
            period,
        );

        let err = fetch_comparison(&provider, period).await.expect_err("error");
        assert_eq!(err, DataFetchError::new("quota exceeded"));
    }

    #[tokio::test]
    async fn current_failure_fails_whole_comparison() {
        let period = ReportingPeriod::LastYear;
        let provider = FixedProvider::new(
            Err("unauthorized".to_string()),
            Ok(snapshot(1, 1, 1.0, 1.0)),
            period,
        );

        let err = fetch_comparison(&provider, period).await.expect_err("error");
        assert_eq!(err.message, "unauthorized");
    }

    #[tokio::test]
    async fn empty_previous_window_reports_zero_change() {
        let period = ReportingPeriod::Last3Months;
        let provider = FixedProvider::new(
            Ok(snapshot(10, 20, 30.0, 40.0)),
            Ok(MetricsSnapshot::default()),
            period,
        );

        let report = fetch_comparison(&provider, period).await.expect("report");
        assert_eq!(report.comparison, ComparisonResult::default());
    }

    #[tokio::test]
    async fn missing_previous_metric_reports_zero_for_that_metric_only() {
        let period = ReportingPeriod::Last7Days;
        let previous: MetricsSnapshot = serde_json::from_value(serde_json::json!({
            "metrics": { "totalUsers": 100, "sessions": 250, "avgSessionDuration": 100.0 }
        }))
        .expect("decode");
        let provider = FixedProvider::new(Ok(snapshot(150, 300, 40.0, 125.0)), Ok(previous), period);

        let report = fetch_comparison(&provider, period).await.expect("report");
        assert_eq!(report.comparison.users, 50.0);
        assert_eq!(report.comparison.sessions, 20.0);
        assert_eq!(report.comparison.bounce_rate, 0.0);
        assert_eq!(report.comparison.duration, 25.0);
    }
}
