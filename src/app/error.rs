use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedhookError {
    #[error("Could not read {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Fetch failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Delivery to {hook} failed: {source}")]
    Delivery {
        hook: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeedhookError>;
