use thiserror::Error;

use crate::config::ConfigError;
use crate::normalizer::tree::TreeError;

#[derive(Error, Debug)]
pub enum CalmError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feed parse error: {0}")]
    Parse(#[from] TreeError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to find a valid feed for \"{0}\"")]
    Discovery(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CalmError>;
