use thiserror::Error;

/// A comparison could not be produced because one of its provider requests
/// failed. Carries the provider's message; there is never a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DataFetchError {
    pub message: String,
}

impl DataFetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DataFetchError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}
