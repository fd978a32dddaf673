//! Error type for registry lookups and configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Transport failure (connect, timeout, TLS).
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("could not decode registry response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure reported by a non-HTTP backend.
    #[error("{0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
