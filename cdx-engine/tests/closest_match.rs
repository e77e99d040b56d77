//! Integration tests for closest-match iteration.

use cdx_core::{CaptureTimestamp, CdxRecord, FieldName};
use cdx_engine::{ClosestIterator, EngineError};
use cdx_index::{
    CdxSource, Direction, IndexError, MemoryCdxSource, RecordStream, SearchKey, SearchResult,
};
use chrono::TimeDelta;
use rand::Rng;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const URL_KEY: &str = "com,example)/";
const TARGET: &str = "20160301120000";

fn record(timestamp: &str) -> CdxRecord {
    CdxRecord::new(vec![
        (FieldName::url_key(), URL_KEY.to_string()),
        (FieldName::timestamp(), timestamp.to_string()),
    ])
}

fn target() -> CaptureTimestamp {
    CaptureTimestamp::parse(TARGET).unwrap()
}

/// Timestamp text at a signed second offset from the target.
fn at_offset(seconds: i64) -> String {
    let base = chrono::NaiveDate::from_ymd_opt(2016, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    (base + TimeDelta::seconds(seconds))
        .format("%Y%m%d%H%M%S")
        .to_string()
}

fn open(source: &impl CdxSource) -> ClosestIterator {
    ClosestIterator::new(source, &SearchKey::exact(URL_KEY), target()).unwrap()
}

/// Drain the iterator, returning the yielded timestamp texts.
fn take_all(iter: &mut ClosestIterator) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(record) = iter.take().unwrap() {
        out.push(record.get(&FieldName::timestamp()).unwrap().to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Scripted sources for teardown and failure tests
// ---------------------------------------------------------------------------

/// A stream over canned records that counts closes and can be told to fail
/// pulls or teardown.
struct ScriptedStream {
    records: Vec<CdxRecord>,
    pos: usize,
    closes: Arc<AtomicUsize>,
    fail_close: bool,
    fail_pull_at: Option<usize>,
}

impl ScriptedStream {
    fn new(records: Vec<CdxRecord>, closes: Arc<AtomicUsize>) -> Self {
        Self {
            records,
            pos: 0,
            closes,
            fail_close: false,
            fail_pull_at: None,
        }
    }
}

impl RecordStream for ScriptedStream {
    fn next_record(&mut self) -> Result<Option<CdxRecord>, IndexError> {
        if self.fail_pull_at == Some(self.pos) {
            return Err(IndexError::Io(std::io::Error::other("scan failed")));
        }
        let record = self.records.get(self.pos).cloned();
        if record.is_some() {
            self.pos += 1;
        }
        Ok(record)
    }

    fn close(&mut self) -> Result<(), IndexError> {
        self.closes.fetch_add(1, Ordering::Relaxed);
        if self.fail_close {
            Err(IndexError::Release("stream teardown failed".into()))
        } else {
            Ok(())
        }
    }
}

/// A source handing out one pre-built result per direction.
struct ScriptedSource {
    forward: RefCell<Option<SearchResult>>,
    backward: RefCell<Option<SearchResult>>,
    searches: Cell<usize>,
}

impl ScriptedSource {
    fn new(forward: ScriptedStream, backward: ScriptedStream) -> Self {
        Self {
            forward: RefCell::new(Some(SearchResult::new(Box::new(forward)))),
            backward: RefCell::new(Some(SearchResult::new(Box::new(backward)))),
            searches: Cell::new(0),
        }
    }

    fn empty() -> Self {
        let closes = Arc::new(AtomicUsize::new(0));
        Self::new(
            ScriptedStream::new(vec![], closes.clone()),
            ScriptedStream::new(vec![], closes),
        )
    }
}

impl CdxSource for ScriptedSource {
    fn search(&self, _key: &SearchKey, direction: Direction) -> Result<SearchResult, IndexError> {
        self.searches.set(self.searches.get() + 1);
        let slot = match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        };
        slot.borrow_mut()
            .take()
            .ok_or_else(|| IndexError::Io(std::io::Error::other("result already taken")))
    }
}

// ---------------------------------------------------------------------------
// Ordering scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_scenario_interleaved_sides() {
    // forward at distances 5 and 20, backward at 10 and 30
    let source = MemoryCdxSource::from_records(vec![
        record(&at_offset(5)),
        record(&at_offset(20)),
        record(&at_offset(-10)),
        record(&at_offset(-30)),
    ]);

    let mut iter = open(&source);
    assert_eq!(
        take_all(&mut iter),
        vec![at_offset(5), at_offset(-10), at_offset(20), at_offset(-30)]
    );
    iter.close().unwrap();
}

#[test]
fn test_scenario_one_side_empty() {
    // forward empty, backward at distances 3 and 8
    let source =
        MemoryCdxSource::from_records(vec![record(&at_offset(-3)), record(&at_offset(-8))]);

    let mut iter = open(&source);
    assert_eq!(take_all(&mut iter), vec![at_offset(-3), at_offset(-8)]);
    assert!(!iter.has_more().unwrap());
    iter.close().unwrap();
}

#[test]
fn test_scenario_tie_prefers_backward() {
    // both sides at distance 7
    let source =
        MemoryCdxSource::from_records(vec![record(&at_offset(7)), record(&at_offset(-7))]);

    let mut iter = open(&source);
    assert_eq!(take_all(&mut iter), vec![at_offset(-7), at_offset(7)]);
    iter.close().unwrap();
}

#[test]
fn test_scenario_wildcard_key_is_rejected_before_any_scan_opens() {
    let source = ScriptedSource::empty();

    let result = ClosestIterator::new(&source, &SearchKey::prefix(URL_KEY), target());
    assert!(matches!(result, Err(EngineError::WildcardKey(_))));
    assert_eq!(source.searches.get(), 0);

    let result = ClosestIterator::new(&source, &SearchKey::domain(URL_KEY), target());
    assert!(matches!(result, Err(EngineError::WildcardKey(_))));
    assert_eq!(source.searches.get(), 0);
}

#[test]
fn test_both_sides_empty() {
    let source = MemoryCdxSource::from_records(vec![]);
    let mut iter = open(&source);
    assert!(!iter.has_more().unwrap());
    assert!(iter.take().unwrap().is_none());
    assert!(iter.peek().unwrap().is_none());
    iter.close().unwrap();
}

#[test]
fn test_capture_at_target_surfaces_from_both_scans() {
    // Both derived ranges include the target itself, so an exact-hit capture
    // reaches the merge through both scans and is yielded twice: the output
    // is the union of what the scans produce, never deduplicated here.
    let source = MemoryCdxSource::from_records(vec![record(TARGET), record(&at_offset(60))]);

    let mut iter = open(&source);
    assert_eq!(
        take_all(&mut iter),
        vec![TARGET.to_string(), TARGET.to_string(), at_offset(60)]
    );
    iter.close().unwrap();
}

// ---------------------------------------------------------------------------
// Monotonic distance and completeness
// ---------------------------------------------------------------------------

fn assert_monotonic_and_complete(offsets: &[i64]) {
    let timestamps: Vec<String> = offsets.iter().map(|&o| at_offset(o)).collect();
    let source =
        MemoryCdxSource::from_records(timestamps.iter().map(|t| record(t)).collect());

    let mut iter = open(&source);
    let yielded = take_all(&mut iter);
    iter.close().unwrap();

    // completeness: same multiset in as out
    let mut expected = timestamps.clone();
    let mut actual = yielded.clone();
    expected.sort();
    actual.sort();
    assert_eq!(expected, actual);

    // monotonic distance
    let target = target();
    let distances: Vec<TimeDelta> = yielded
        .iter()
        .map(|t| CaptureTimestamp::parse(t).unwrap().distance_to(&target))
        .collect();
    for pair in distances.windows(2) {
        assert!(pair[0] <= pair[1], "distances went backward: {distances:?}");
    }
}

#[test]
fn test_monotonic_distance_fixed_inputs() {
    assert_monotonic_and_complete(&[1, 2, 3, -1, -2, -3]);
    assert_monotonic_and_complete(&[3600, 7200, -60, -120, -10800]);
    assert_monotonic_and_complete(&[42]);
    assert_monotonic_and_complete(&[-42]);
}

#[test]
fn test_monotonic_distance_random_inputs() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        let count = rng.random_range(1..40);
        let offsets: Vec<i64> = (0..count)
            .map(|_| {
                let magnitude = rng.random_range(1..=86_400);
                if rng.random_bool(0.5) { magnitude } else { -magnitude }
            })
            .collect();
        assert_monotonic_and_complete(&offsets);
    }
}

// ---------------------------------------------------------------------------
// Peek and take semantics
// ---------------------------------------------------------------------------

#[test]
fn test_peek_is_idempotent() {
    let source =
        MemoryCdxSource::from_records(vec![record(&at_offset(5)), record(&at_offset(-10))]);

    let mut iter = open(&source);

    let first = iter.peek().unwrap().unwrap().clone();
    let second = iter.peek().unwrap().unwrap().clone();
    assert_eq!(first, second);

    // peek did not advance consumption
    let taken = iter.take().unwrap().unwrap();
    assert_eq!(taken, first);

    // next peek moves on to the following record
    let next = iter.peek().unwrap().unwrap();
    assert_eq!(next.get(&FieldName::timestamp()), Some(at_offset(-10).as_str()));
    iter.close().unwrap();
}

#[test]
fn test_repeated_probes_do_not_overconsume() {
    let source = MemoryCdxSource::from_records(vec![record(&at_offset(5))]);

    let mut iter = open(&source);
    assert!(iter.has_more().unwrap());
    assert!(iter.has_more().unwrap());
    assert!(iter.has_more().unwrap());

    assert!(iter.take().unwrap().is_some());
    assert!(!iter.has_more().unwrap());
    iter.close().unwrap();
}

// ---------------------------------------------------------------------------
// Failure propagation
// ---------------------------------------------------------------------------

#[test]
fn test_malformed_timestamp_surfaces_at_the_pull_that_needed_it() {
    let closes = Arc::new(AtomicUsize::new(0));
    let source = ScriptedSource::new(
        ScriptedStream::new(
            vec![record(&at_offset(5)), record("20xx")],
            closes.clone(),
        ),
        ScriptedStream::new(vec![], closes.clone()),
    );

    let mut iter = open(&source);

    // first record is fine
    assert!(iter.take().unwrap().is_some());

    // the malformed record poisons the probe that pulls it
    assert!(matches!(iter.take(), Err(EngineError::Record(_))));

    // teardown still releases both sides
    iter.close().unwrap();
    assert_eq!(closes.load(Ordering::Relaxed), 2);
}

#[test]
fn test_scan_failure_propagates() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut failing = ScriptedStream::new(vec![record(&at_offset(5))], closes.clone());
    failing.fail_pull_at = Some(0);
    let source = ScriptedSource::new(failing, ScriptedStream::new(vec![], closes));

    let mut iter = open(&source);
    assert!(matches!(iter.take(), Err(EngineError::Source(_))));
    iter.close().unwrap();
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[test]
fn test_close_releases_both_sides_exactly_once() {
    let forward_closes = Arc::new(AtomicUsize::new(0));
    let backward_closes = Arc::new(AtomicUsize::new(0));
    let source = ScriptedSource::new(
        ScriptedStream::new(vec![record(&at_offset(5))], forward_closes.clone()),
        ScriptedStream::new(vec![record(&at_offset(-5))], backward_closes.clone()),
    );

    let mut iter = open(&source);
    // consume only part of the output before closing
    assert!(iter.take().unwrap().is_some());

    iter.close().unwrap();
    assert_eq!(forward_closes.load(Ordering::Relaxed), 1);
    assert_eq!(backward_closes.load(Ordering::Relaxed), 1);

    // idempotent
    iter.close().unwrap();
    assert_eq!(forward_closes.load(Ordering::Relaxed), 1);
    assert_eq!(backward_closes.load(Ordering::Relaxed), 1);
}

#[test]
fn test_failed_release_does_not_skip_the_other_side() {
    let forward_closes = Arc::new(AtomicUsize::new(0));
    let backward_closes = Arc::new(AtomicUsize::new(0));

    let mut forward = ScriptedStream::new(vec![], forward_closes.clone());
    forward.fail_close = true;
    let backward = ScriptedStream::new(vec![], backward_closes.clone());
    let source = ScriptedSource::new(forward, backward);

    let mut iter = open(&source);
    match iter.close() {
        Err(EngineError::Release(failure)) => {
            assert!(failure.forward.is_some());
            assert!(failure.backward.is_none());
        }
        other => panic!("expected release failure, got {other:?}"),
    }
    assert_eq!(forward_closes.load(Ordering::Relaxed), 1);
    assert_eq!(backward_closes.load(Ordering::Relaxed), 1);
}

#[test]
fn test_release_failures_are_aggregated() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut forward = ScriptedStream::new(vec![], closes.clone());
    forward.fail_close = true;
    let mut backward = ScriptedStream::new(vec![], closes.clone());
    backward.fail_close = true;
    let source = ScriptedSource::new(forward, backward);

    let mut iter = open(&source);
    match iter.close() {
        Err(EngineError::Release(failure)) => {
            assert!(failure.forward.is_some());
            assert!(failure.backward.is_some());
            let message = failure.to_string();
            assert!(message.contains("forward"));
            assert!(message.contains("backward"));
        }
        other => panic!("expected release failure, got {other:?}"),
    }
    assert_eq!(closes.load(Ordering::Relaxed), 2);
}

#[test]
fn test_use_after_close_fails_fast() {
    let source = MemoryCdxSource::from_records(vec![record(&at_offset(5))]);
    let mut iter = open(&source);
    iter.close().unwrap();

    assert!(matches!(iter.has_more(), Err(EngineError::Closed)));
    assert!(matches!(iter.take(), Err(EngineError::Closed)));
    assert!(matches!(iter.peek(), Err(EngineError::Closed)));
}

#[test]
fn test_close_still_releases_after_a_failed_pull() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut failing = ScriptedStream::new(vec![], closes.clone());
    failing.fail_pull_at = Some(0);
    let source = ScriptedSource::new(failing, ScriptedStream::new(vec![], closes.clone()));

    let mut iter = open(&source);
    assert!(iter.take().is_err());

    iter.close().unwrap();
    assert_eq!(closes.load(Ordering::Relaxed), 2);
}
