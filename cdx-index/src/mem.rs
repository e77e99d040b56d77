//! In-memory reference source.
//!
//! Holds records sorted the way a real CDX index is sorted: by url key,
//! then by the fixed-width timestamp text. Range scans are plain ordered
//! walks over that sort order, which makes this source useful both as a
//! test double and as documentation of the ordering contract.

use crate::error::{IndexError, Result};
use crate::search_key::{DateRange, Direction, MatchType, SearchKey};
use crate::source::{CdxSource, RecordStream, SearchResult};
use cdx_core::{CdxRecord, FieldName};
use tracing::trace;

/// A memory-backed CDX source.
pub struct MemoryCdxSource {
    records: Vec<CdxRecord>,
}

impl MemoryCdxSource {
    /// Build a source from records, sorting them into index order.
    pub fn from_records(mut records: Vec<CdxRecord>) -> Self {
        records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Index sort key: (url key, 14-digit timestamp text).
///
/// Fixed-width digit strings compare lexicographically in chronological
/// order, so no parsing is needed to sort or range-filter.
fn sort_key(record: &CdxRecord) -> (&str, &str) {
    (
        record.get(&FieldName::url_key()).unwrap_or(""),
        record.get(&FieldName::timestamp()).unwrap_or(""),
    )
}

fn key_matches(url_key: &str, key: &SearchKey) -> bool {
    match key.match_type() {
        MatchType::Exact => url_key == key.url_key(),
        MatchType::Prefix => url_key.starts_with(key.url_key()),
        // Domain matching needs SURT-aware key surgery this source does not do.
        MatchType::Domain => false,
    }
}

fn range_bounds(range: Option<&DateRange>) -> (Option<String>, Option<String>) {
    match range {
        None => (None, None),
        Some(range) => (
            range.start().map(|ts| ts.to_string()),
            range.end().map(|ts| ts.to_string()),
        ),
    }
}

impl CdxSource for MemoryCdxSource {
    fn search(&self, key: &SearchKey, direction: Direction) -> Result<SearchResult> {
        if key.match_type() == MatchType::Domain {
            return Err(IndexError::UnsupportedMatch(key.match_type()));
        }

        let (start, end) = range_bounds(key.date_range());

        let mut matches: Vec<CdxRecord> = self
            .records
            .iter()
            .filter(|record| {
                let (url_key, timestamp) = sort_key(record);
                key_matches(url_key, key)
                    && start.as_deref().is_none_or(|s| timestamp >= s)
                    && end.as_deref().is_none_or(|e| timestamp <= e)
            })
            .cloned()
            .collect();

        if direction == Direction::Backward {
            matches.reverse();
        }

        trace!(
            url_key = key.url_key(),
            ?direction,
            matches = matches.len(),
            "memory scan"
        );

        Ok(SearchResult::new(Box::new(MemoryStream {
            records: matches.into_iter(),
        })))
    }
}

struct MemoryStream {
    records: std::vec::IntoIter<CdxRecord>,
}

impl RecordStream for MemoryStream {
    fn next_record(&mut self) -> Result<Option<CdxRecord>> {
        Ok(self.records.next())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
