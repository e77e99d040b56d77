//! Closest-match querying over CDX sources.
//!
//! Given an exact url key and a target timestamp, [`ClosestIterator`] merges
//! a forward scan (captures at or after the target, ascending) and a
//! backward scan (captures at or before the target, descending) into a
//! single stream ordered by absolute temporal distance to the target. The
//! merge is lazy: at most one unreturned record is buffered per side, so
//! arbitrarily large scans stream without materialization.

pub mod closest;
pub mod error;

pub use closest::ClosestIterator;
pub use error::{EngineError, ReleaseFailure, Result};
