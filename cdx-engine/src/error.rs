//! Error types for closest-match queries.

use cdx_core::record::RecordError;
use cdx_index::{IndexError, MatchType};
use std::fmt;
use thiserror::Error;

/// Per-side teardown failures from [`ClosestIterator::close`].
///
/// Both sides are always attempted; a side that released cleanly is `None`.
///
/// [`ClosestIterator::close`]: crate::ClosestIterator::close
#[derive(Debug)]
pub struct ReleaseFailure {
    pub forward: Option<IndexError>,
    pub backward: Option<IndexError>,
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        if let Some(err) = &self.forward {
            write!(f, "forward: {err}")?;
            separator = "; ";
        }
        if let Some(err) = &self.backward {
            write!(f, "{separator}backward: {err}")?;
        }
        Ok(())
    }
}

/// Errors that can occur running a closest-match query.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Closest match is defined only for an exact url key; wildcard keys
    /// must be resolved to a single key first.
    #[error("closest match requires an exact url key, got a {0} match")]
    WildcardKey(MatchType),

    /// A pulled record's timestamp field was absent or malformed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The underlying index failed while deriving or pulling a scan.
    #[error(transparent)]
    Source(#[from] IndexError),

    /// One or both scans failed to release on close.
    #[error("failed to release search results: {0}")]
    Release(ReleaseFailure),

    /// The iterator was used after close.
    #[error("iterator used after close")]
    Closed,

    /// Element removal is not a capability of CDX record streams.
    #[error("cdx record streams do not support element removal")]
    Unsupported,
}

/// A specialized Result type for closest-match queries.
pub type Result<T> = std::result::Result<T, EngineError>;
