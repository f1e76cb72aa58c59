pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod period;
