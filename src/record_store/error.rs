use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record store is not initialized: {0}")]
    NotInitialized(String),

    #[error("record store request failed: {0}")]
    Transport(String),

    #[error("malformed record store response: {0}")]
    Malformed(String),

    #[error("invalid range `{0}`")]
    InvalidRange(String),
}

impl StoreError {
    /// True when the store was never reachable, as opposed to a failed call.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::NotInitialized(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        StoreError::Transport(value.to_string())
    }
}
