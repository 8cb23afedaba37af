//! Normalization Error Types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors during normalization
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// Nothing left after windowing. Reported instead of an empty batch,
    /// which would read as calm conditions.
    #[error("No observations within the trailing window ({observations} collected, cutoff {cutoff:?})")]
    EmptyWindow {
        observations: usize,
        cutoff: Option<DateTime<Utc>>,
    },

    /// Window duration cannot be used for time arithmetic
    #[error("Invalid window duration: {0}")]
    InvalidWindow(String),
}
