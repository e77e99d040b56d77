//! Error types for index queries.

use crate::search_key::MatchType;
use thiserror::Error;

/// Errors that can occur querying a CDX source.
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error from the underlying index storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stream or result was used after being closed.
    #[error("search result used after close")]
    Closed,

    /// Releasing underlying resources failed.
    #[error("failed to release search result resources: {0}")]
    Release(String),

    /// The source does not implement the requested match type.
    #[error("{0} match is not supported by this source")]
    UnsupportedMatch(MatchType),

    /// A doubly-bounded date range with start after end.
    #[error("invalid date range: start is after end")]
    InvalidDateRange,
}

/// A specialized Result type for index queries.
pub type Result<T> = std::result::Result<T, IndexError>;
