use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use pulseboard_core::analytics::{MetricsProvider, MetricsRequest};
use pulseboard_core::config::HttpProviderConfig;
use pulseboard_core::metrics::MetricsSnapshot;

/// Metrics provider reached over HTTP.
///
/// Issues `GET {base_url}/metrics` with either `period=<label>` or an explicit
/// `startDate`/`endDate` pair. The response body is a snapshot, optionally
/// wrapped as `{"data": ...}`.
#[derive(Clone)]
pub struct HttpMetricsProvider {
    client: Client,
    config: HttpProviderConfig,
}

impl HttpMetricsProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("metrics provider client build failed")?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/metrics", self.config.base_url.trim_end_matches('/'))
    }

    fn query_pairs(&self, request: &MetricsRequest) -> Vec<(&'static str, String)> {
        let mut pairs = match request {
            MetricsRequest::Period(period) => vec![("period", period.as_label().to_string())],
            MetricsRequest::Range(range) => vec![
                ("startDate", range.start_date.to_string()),
                ("endDate", range.end_date.to_string()),
            ],
        };
        if let Some(property_id) = &self.config.property_id {
            pairs.push(("propertyId", property_id.clone()));
        }
        pairs
    }
}

#[async_trait::async_trait]
impl MetricsProvider for HttpMetricsProvider {
    async fn fetch_metrics(&self, request: &MetricsRequest) -> Result<MetricsSnapshot> {
        let mut builder = self
            .client
            .get(self.endpoint())
            .query(&self.query_pairs(request));
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        debug!(?request, "Requesting metrics");
        let resp = builder
            .send()
            .await
            .context("metrics provider request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("metrics provider returned {status}: {body}");
        }

        let mut body: Value = resp
            .json()
            .await
            .context("metrics provider response parse failed")?;
        let payload = match body.as_object_mut().and_then(|obj| obj.remove("data")) {
            Some(data) => data,
            None => body,
        };
        serde_json::from_value(payload).context("metrics provider response parse failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseboard_core::analytics::fetch_comparison;
    use pulseboard_core::period::ReportingPeriod;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> HttpProviderConfig {
        HttpProviderConfig {
            base_url: base_url.to_string(),
            api_token: None,
            property_id: None,
            timeout_secs: 5,
        }
    }

    fn body(users: u64, sessions: u64, bounce: f64, duration: f64) -> serde_json::Value {
        json!({
            "metrics": {
                "totalUsers": users,
                "sessions": sessions,
                "bounceRate": bounce,
                "avgSessionDuration": duration
            },
            "pageViews": [{ "date": "2026-02-10", "views": 12 }],
            "demographics": [],
            "devices": [{ "name": "desktop", "value": 70 }],
            "topPages": [{ "path": "/", "pageviews": 12, "avgTimeOnPage": 40.0 }]
        })
    }

    #[tokio::test]
    async fn period_request_sends_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("period", "last30Days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(5, 6, 10.0, 20.0)))
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpMetricsProvider::new(config(&server.uri())).expect("provider");
        let snapshot = provider
            .fetch_metrics(&MetricsRequest::Period(ReportingPeriod::Last30Days))
            .await
            .expect("snapshot");
        assert_eq!(snapshot.metrics.total_users, 5);
        assert_eq!(snapshot.devices[0].name, "desktop");
    }

    #[tokio::test]
    async fn range_request_sends_boundaries_token_and_property() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("startDate", "-6months"))
            .and(query_param("endDate", "-3months"))
            .and(query_param("propertyId", "prop-42"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": body(1, 2, 3.0, 4.0) })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut cfg = config(&format!("{}/", server.uri()));
        cfg.api_token = Some("secret".to_string());
        cfg.property_id = Some("prop-42".to_string());
        let provider = HttpMetricsProvider::new(cfg).expect("provider");

        let snapshot = provider
            .fetch_metrics(&MetricsRequest::Range(
                ReportingPeriod::Last3Months.previous_range(),
            ))
            .await
            .expect("snapshot");
        assert_eq!(snapshot.metrics.sessions, 2);
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exhausted"))
            .mount(&server)
            .await;

        let provider = HttpMetricsProvider::new(config(&server.uri())).expect("provider");
        let err = provider
            .fetch_metrics(&MetricsRequest::Period(ReportingPeriod::Last7Days))
            .await
            .expect_err("403");
        let message = err.to_string();
        assert!(message.contains("403"), "{message}");
        assert!(message.contains("quota exhausted"), "{message}");
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": [] })))
            .mount(&server)
            .await;

        let provider = HttpMetricsProvider::new(config(&server.uri())).expect("provider");
        let err = provider
            .fetch_metrics(&MetricsRequest::Period(ReportingPeriod::Last7Days))
            .await
            .expect_err("bad body");
        let message = format!("{err:#}");
        assert!(message.contains("parse failed"), "{message}");
        assert!(message.contains("missing field `metrics`"), "{message}");
    }

    #[tokio::test]
    async fn invalid_enveloped_field_is_named_in_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "metrics": { "totalUsers": -5 } }
            })))
            .mount(&server)
            .await;

        let provider = HttpMetricsProvider::new(config(&server.uri())).expect("provider");
        let err = provider
            .fetch_metrics(&MetricsRequest::Period(ReportingPeriod::Last7Days))
            .await
            .expect_err("negative count");
        let message = format!("{err:#}");
        assert!(message.contains("-5"), "{message}");
        assert!(message.contains("u64"), "{message}");
    }

    #[tokio::test]
    async fn comparison_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("period", "last7Days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(150, 300, 40.0, 125.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("startDate", "-14days"))
            .and(query_param("endDate", "-7days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(100, 250, 50.0, 100.0)))
            .mount(&server)
            .await;

        let provider = HttpMetricsProvider::new(config(&server.uri())).expect("provider");
        let report = fetch_comparison(&provider, ReportingPeriod::Last7Days)
            .await
            .expect("report");
        assert_eq!(report.comparison.users, 50.0);
        assert_eq!(report.comparison.sessions, 20.0);
        assert_eq!(report.comparison.bounce_rate, -20.0);
        assert_eq!(report.comparison.duration, 25.0);
    }

    #[tokio::test]
    async fn comparison_tolerates_metric_missing_from_previous_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("period", "last7Days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(150, 300, 40.0, 125.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("startDate", "-14days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "metrics": {
                        "totalUsers": 100,
                        "sessions": 250,
                        "avgSessionDuration": 100.0
                    }
                }
            })))
            .mount(&server)
            .await;

        let provider = HttpMetricsProvider::new(config(&server.uri())).expect("provider");
        let report = fetch_comparison(&provider, ReportingPeriod::Last7Days)
            .await
            .expect("report");
        assert_eq!(report.comparison.users, 50.0);
        assert_eq!(report.comparison.sessions, 20.0);
        assert_eq!(report.comparison.bounce_rate, 0.0);
        assert_eq!(report.comparison.duration, 25.0);
        assert_eq!(report.snapshot.metrics.bounce_rate, 40.0);
    }

    #[tokio::test]
    async fn comparison_fails_when_previous_window_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("period", "last7Days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(1, 1, 1.0, 1.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(query_param("startDate", "-14days"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(&server)
            .await;

        let provider = HttpMetricsProvider::new(config(&server.uri())).expect("provider");
        let err = fetch_comparison(&provider, ReportingPeriod::Last7Days)
            .await
            .expect_err("previous window failed");
        assert!(err.message.contains("backend down"), "{}", err.message);
    }
}
