//! Query surface over CDX sources.
//!
//! This crate defines how the rest of the system talks to a time-sorted
//! archival index:
//!
//! - **SearchKey**: an url key with a match type and an optional date range
//! - **CdxSource**: the range-scan capability an index implementation provides
//! - **RecordStream / SearchResult**: resource-owning, forward-only cursors
//!   over the records a scan produces
//! - **MemoryCdxSource**: an in-memory reference source
//!
//! Scans are ordered: a Forward scan yields records in non-decreasing
//! timestamp order, a Backward scan in non-increasing order. Everything
//! downstream (in particular closest-match merging) depends on that.

pub mod error;
pub mod mem;
pub mod search_key;
pub mod source;

pub use error::{IndexError, Result};
pub use mem::MemoryCdxSource;
pub use search_key::{DateRange, Direction, MatchType, SearchKey};
pub use source::{CdxSource, RecordStream, SearchResult, SourceLease};
