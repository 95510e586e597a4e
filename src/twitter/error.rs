use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by the API (resets at {reset:?})")]
    RateLimited { reset: Option<i64> },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Bird CLI not found. Install with: bun install -g bird-cli")]
    BirdMissing,

    #[error("Bird command failed: {0}")]
    Command(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Command(err.to_string())
    }
}
