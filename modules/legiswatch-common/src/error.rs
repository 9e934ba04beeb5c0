use thiserror::Error;

#[derive(Error, Debug)]
pub enum LegisWatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No bills found in any jurisdiction/keyword combination ({attempts} queries tried)")]
    NoBillsFound { attempts: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
