//! The closest-match merge iterator.
//!
//! Two independently ordered scans, one forward from the target and one
//! backward from it, each yield records whose distance to the target is
//! non-decreasing as the scan advances. Merging them by smallest buffered
//! distance therefore yields a globally non-decreasing distance sequence,
//! which is the whole correctness argument; no sorting happens here.

use crate::error::{EngineError, ReleaseFailure, Result};
use cdx_core::{CaptureTimestamp, CdxRecord};
use cdx_index::{CdxSource, DateRange, Direction, SearchKey, SearchResult};
use chrono::TimeDelta;
use tracing::{debug, trace};

/// A pulled-but-not-yet-yielded record with its precomputed distance to the
/// target.
struct Candidate {
    record: CdxRecord,
    distance: TimeDelta,
}

impl Candidate {
    /// Wrap a freshly pulled record.
    ///
    /// A missing or malformed timestamp is fatal for the pull that needed
    /// it: skipping or defaulting the record would break the non-decreasing
    /// distance ordering downstream consumers rely on.
    fn new(record: CdxRecord, target: &CaptureTimestamp) -> Result<Self> {
        let captured = record.capture_timestamp()?;
        Ok(Self {
            distance: captured.distance_to(target),
            record,
        })
    }
}

/// An iterator over a CDX source yielding records sorted by distance to a
/// target timestamp.
///
/// Construction derives two range scans from the caller's key (captures at
/// or after the target walked Forward, captures at or before it walked
/// Backward) and the iterator merges them lazily. Callers drive it with
/// [`has_more`](Self::has_more) / [`take`](Self::take) /
/// [`peek`](Self::peek) and release it with [`close`](Self::close).
///
/// Single-threaded pull model: no internal synchronization, no blocking of
/// its own. Concurrent use requires external serialization.
pub struct ClosestIterator {
    forward: SearchResult,
    backward: SearchResult,
    target: CaptureTimestamp,
    forward_candidate: Option<Candidate>,
    backward_candidate: Option<Candidate>,
    next_out: Option<CdxRecord>,
    closed: bool,
}

impl ClosestIterator {
    /// Open a closest-match iteration for `key` around `target`.
    ///
    /// Fails with [`EngineError::WildcardKey`] before opening any scan if
    /// the key's match semantics are not exact. If the backward scan fails
    /// to open, the already opened forward scan is released first.
    pub fn new(
        source: &dyn CdxSource,
        key: &SearchKey,
        target: CaptureTimestamp,
    ) -> Result<Self> {
        if key.match_type().is_wildcard() {
            return Err(EngineError::WildcardKey(key.match_type()));
        }

        debug!(url_key = key.url_key(), %target, "opening closest-match scans");

        let forward_key = key.clone().with_date_range(DateRange::starting_at(target));
        let backward_key = key.clone().with_date_range(DateRange::ending_at(target));

        let forward = source.search(&forward_key, Direction::Forward)?;
        let backward = match source.search(&backward_key, Direction::Backward) {
            Ok(result) => result,
            Err(err) => {
                // The open error is the interesting one; teardown failure of
                // the half-opened side cannot mask it.
                let mut forward = forward;
                let _ = forward.close();
                return Err(err.into());
            }
        };

        Ok(Self {
            forward,
            backward,
            target,
            forward_candidate: None,
            backward_candidate: None,
            next_out: None,
            closed: false,
        })
    }

    /// Probe for more output, buffering the next record if there is one.
    ///
    /// Idempotent while an output record is buffered. Otherwise refills each
    /// empty candidate slot with at most one pull from its scan, then moves
    /// the candidate with the smaller distance to the output slot. An exact
    /// distance tie selects the backward side: the earlier-or-equal capture
    /// is preferred over the later one.
    pub fn has_more(&mut self) -> Result<bool> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        if self.next_out.is_some() {
            return Ok(true);
        }

        if self.forward_candidate.is_none() {
            if let Some(record) = self.forward.next_record()? {
                self.forward_candidate = Some(Candidate::new(record, &self.target)?);
            }
        }
        if self.backward_candidate.is_none() {
            if let Some(record) = self.backward.next_record()? {
                self.backward_candidate = Some(Candidate::new(record, &self.target)?);
            }
        }

        let take_backward = match (&self.forward_candidate, &self.backward_candidate) {
            (None, None) => return Ok(false),
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(forward), Some(backward)) => backward.distance <= forward.distance,
        };

        let side = if take_backward {
            &mut self.backward_candidate
        } else {
            &mut self.forward_candidate
        };
        if let Some(candidate) = side.take() {
            trace!(
                distance_secs = candidate.distance.num_seconds(),
                backward = take_backward,
                "buffered next record"
            );
            self.next_out = Some(candidate.record);
        }

        Ok(true)
    }

    /// Consume and return the next record, or `None` when exhausted.
    ///
    /// Ownership of the record transfers to the caller. Calling `take`
    /// repeatedly without intervening probes is equivalent to probing before
    /// each call.
    pub fn take(&mut self) -> Result<Option<CdxRecord>> {
        if !self.has_more()? {
            return Ok(None);
        }
        Ok(self.next_out.take())
    }

    /// Return the next record without consuming it.
    ///
    /// Repeated peeks return the same record until `take` is called.
    pub fn peek(&mut self) -> Result<Option<&CdxRecord>> {
        if !self.has_more()? {
            return Ok(None);
        }
        Ok(self.next_out.as_ref())
    }

    /// Release both scans.
    ///
    /// Both sides are always attempted, even when the first fails; failures
    /// are reported together. Closing an already-closed iterator is a no-op.
    /// Further probe/take/peek calls fail with [`EngineError::Closed`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.forward_candidate = None;
        self.backward_candidate = None;
        self.next_out = None;

        let forward = self.forward.close().err();
        let backward = self.backward.close().err();

        debug!(
            forward_failed = forward.is_some(),
            backward_failed = backward.is_some(),
            "closed closest-match scans"
        );

        if forward.is_none() && backward.is_none() {
            Ok(())
        } else {
            Err(EngineError::Release(ReleaseFailure { forward, backward }))
        }
    }

    /// Element removal is not supported.
    pub fn remove(&mut self) -> Result<()> {
        Err(EngineError::Unsupported)
    }
}
