//! Error type for the ambient layers (config loading, server)
//!
//! The state machine itself has no error paths: denied clicks are no-ops
//! and the verification failure is a designed outcome, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid timings: {0}")]
    InvalidTimings(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
