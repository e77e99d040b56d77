//! Source and stream abstractions for range scans.
//!
//! A [`CdxSource`] turns a search key plus direction into a [`SearchResult`]:
//! an ordered, forward-only cursor over records together with whatever
//! resources the scan holds open (file handles, mmaps, block leases). The
//! consumer pulls records one at a time and closes the result exactly once.

use crate::error::{IndexError, Result};
use crate::search_key::{Direction, SearchKey};
use cdx_core::CdxRecord;

/// A forward-only, resource-bearing cursor over records in a fixed order.
///
/// Streams are single-use: once `next_record` returns `Ok(None)` the scan is
/// exhausted, and `close` must be called regardless of how far the stream
/// was consumed.
pub trait RecordStream {
    /// Pull the next record, or `None` when the scan is exhausted.
    ///
    /// Exhaustion is not an error; errors mean the pull itself failed.
    fn next_record(&mut self) -> Result<Option<CdxRecord>>;

    /// Release the resources backing this stream.
    fn close(&mut self) -> Result<()>;
}

/// A companion resource handle tied to a scan's lifetime.
///
/// Some index implementations hold resources beyond the stream itself (a
/// block cache lease, a snapshot pin). Those are released alongside the
/// stream through this trait.
pub trait SourceLease {
    fn release(&mut self) -> Result<()>;
}

/// The ordered record stream a [`CdxSource`] scan produced, plus its
/// companion resources.
///
/// `close` attempts every teardown step even when an earlier one fails and
/// is idempotent; pulling from a closed result fails fast.
pub struct SearchResult {
    stream: Box<dyn RecordStream>,
    lease: Option<Box<dyn SourceLease>>,
    closed: bool,
}

impl SearchResult {
    pub fn new(stream: Box<dyn RecordStream>) -> Self {
        Self {
            stream,
            lease: None,
            closed: false,
        }
    }

    /// Attach a companion resource handle released on close.
    pub fn with_lease(mut self, lease: Box<dyn SourceLease>) -> Self {
        self.lease = Some(lease);
        self
    }

    /// Pull the next record from the underlying stream.
    pub fn next_record(&mut self) -> Result<Option<CdxRecord>> {
        if self.closed {
            return Err(IndexError::Closed);
        }
        self.stream.next_record()
    }

    /// Release the stream and any companion lease.
    ///
    /// Both teardown steps are attempted even if the first fails; failures
    /// are combined into a single error. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let stream = self.stream.close();
        let lease = match self.lease.as_mut() {
            Some(lease) => lease.release(),
            None => Ok(()),
        };

        match (stream, lease) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
            (Err(stream), Err(lease)) => Err(IndexError::Release(format!(
                "stream: {stream}; lease: {lease}"
            ))),
        }
    }
}

impl Drop for SearchResult {
    fn drop(&mut self) {
        // Last-resort teardown for results dropped without an explicit close.
        let _ = self.close();
    }
}

/// The range-scan capability an index implementation provides.
///
/// Implementations must uphold the ordering contract: records satisfy the
/// key and its date range, a Forward scan yields non-decreasing timestamps,
/// a Backward scan non-increasing ones.
pub trait CdxSource {
    fn search(&self, key: &SearchKey, direction: Direction) -> Result<SearchResult>;
}
