//! Fetch Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting raw observations
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading a saved payload failed
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload is not shaped like an observation feed
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}
