pub mod fixture;
pub mod http;

pub use fixture::StaticMetricsProvider;
pub use http::HttpMetricsProvider;
