/// Re-export `Config` from `pulseboard-core` for use within this crate.
///
/// Environment parsing lives in `pulseboard-core` so integration tests can
/// build a `Config` without going through the server.
pub use pulseboard_core::config::{Config, HttpProviderConfig, ProviderMode};
