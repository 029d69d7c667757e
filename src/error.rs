//! Error types shared across the pipeline.
//!
//! Network failures live in [`crate::fetch::FetchError`] and are wrapped by
//! [`Error::Network`] when they have to cross a module boundary. Most of the
//! pipeline never propagates them: a failed source is logged and skipped.

use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::FetchError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Timeout, connection failure or an unexpected HTTP status.
    #[error(transparent)]
    Network(#[from] FetchError),

    /// A feed or page could not be parsed.
    #[error("failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    /// The snapshot could not be written. The prior file has been restored.
    #[error("failed to persist snapshot to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// The source registry file is missing or malformed.
    #[error("invalid source registry {origin}: {reason}")]
    Registry { origin: String, reason: String },
}

impl Error {
    pub fn parse(what: impl Into<String>, reason: impl ToString) -> Self {
        Error::Parse {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}
