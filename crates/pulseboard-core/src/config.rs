use std::time::Duration;

use crate::period::ReportingPeriod;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub provider: ProviderMode,
    pub cors_origins: Vec<String>,
    pub default_period: ReportingPeriod,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderMode {
    /// Built-in sample data; no external calls.
    Demo,
    Http(HttpProviderConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpProviderConfig {
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_token: Option<String>,
    pub property_id: Option<String>,
    pub timeout_secs: u64,
}

impl HttpProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(var: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match var("PULSEBOARD_PROVIDER").as_deref().map(str::trim) {
            Some("demo") => ProviderMode::Demo,
            None | Some("") | Some("http") => ProviderMode::Http(HttpProviderConfig {
                base_url: var("PULSEBOARD_PROVIDER_URL")
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| {
                        "PULSEBOARD_PROVIDER_URL required when PROVIDER=http".to_string()
                    })?,
                api_token: var("PULSEBOARD_PROVIDER_TOKEN").filter(|v| !v.is_empty()),
                property_id: var("PULSEBOARD_PROPERTY_ID").filter(|v| !v.is_empty()),
                timeout_secs: var("PULSEBOARD_PROVIDER_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .map_err(|e| format!("invalid PULSEBOARD_PROVIDER_TIMEOUT_SECS: {e}"))?,
            }),
            Some(other) => {
                return Err(format!(
                    "invalid PULSEBOARD_PROVIDER '{other}' (expected http or demo)"
                ))
            }
        };

        Ok(Self {
            port: var("PULSEBOARD_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            provider,
            cors_origins: var("PULSEBOARD_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            default_period: ReportingPeriod::parse(var("PULSEBOARD_DEFAULT_PERIOD").as_deref())
                .map_err(|e| format!("invalid PULSEBOARD_DEFAULT_PERIOD: {e}"))?,
        })
    }
}
