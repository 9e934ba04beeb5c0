use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpenStatesError>;

#[derive(Debug, Error)]
pub enum OpenStatesError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Invalid API key: {0}")]
    InvalidKey(String),
}

impl From<reqwest::Error> for OpenStatesError {
    fn from(err: reqwest::Error) -> Self {
        OpenStatesError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for OpenStatesError {
    fn from(err: serde_json::Error) -> Self {
        OpenStatesError::Parse(err.to_string())
    }
}
