//! Search keys, date ranges, and scan direction.

use crate::error::{IndexError, Result};
use cdx_core::CaptureTimestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an url key matches against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// The key matches a single canonicalized url.
    Exact,
    /// The key matches every url it is a prefix of.
    Prefix,
    /// The key matches every url under a host and its subdomains.
    Domain,
}

impl MatchType {
    /// True for the wildcard match types (everything except Exact).
    pub fn is_wildcard(self) -> bool {
        self != MatchType::Exact
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchType::Exact => "exact",
            MatchType::Prefix => "prefix",
            MatchType::Domain => "domain",
        };
        write!(f, "{name}")
    }
}

/// Direction for scanning through records.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Scan forward in time (from older to newer records).
    #[default]
    Forward,
    /// Scan backward in time (from newer to older records).
    Backward,
}

/// An inclusive, possibly half-bounded range over capture timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: Option<CaptureTimestamp>,
    end: Option<CaptureTimestamp>,
}

impl DateRange {
    /// All captures at or after `start`.
    pub fn starting_at(start: CaptureTimestamp) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// All captures at or before `end`.
    pub fn ending_at(end: CaptureTimestamp) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// All captures between `start` and `end`, both inclusive.
    pub fn between(start: CaptureTimestamp, end: CaptureTimestamp) -> Result<Self> {
        if start > end {
            return Err(IndexError::InvalidDateRange);
        }
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    pub fn start(&self) -> Option<CaptureTimestamp> {
        self.start
    }

    pub fn end(&self) -> Option<CaptureTimestamp> {
        self.end
    }

    pub fn contains(&self, ts: &CaptureTimestamp) -> bool {
        self.start.is_none_or(|start| *ts >= start) && self.end.is_none_or(|end| *ts <= end)
    }
}

/// An url key with a match type and an optional date range.
///
/// The key is expected in canonicalized (SURT) form; canonicalization itself
/// belongs to the layer that produced the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKey {
    url_key: String,
    match_type: MatchType,
    date_range: Option<DateRange>,
}

impl SearchKey {
    /// A key matching a single canonicalized url.
    pub fn exact(url_key: impl Into<String>) -> Self {
        Self::new(url_key, MatchType::Exact)
    }

    /// A key matching every url it is a prefix of.
    pub fn prefix(url_key: impl Into<String>) -> Self {
        Self::new(url_key, MatchType::Prefix)
    }

    /// A key matching every url under a host and its subdomains.
    pub fn domain(url_key: impl Into<String>) -> Self {
        Self::new(url_key, MatchType::Domain)
    }

    fn new(url_key: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            url_key: url_key.into(),
            match_type,
            date_range: None,
        }
    }

    /// Restrict the key to a date range.
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn url_key(&self) -> &str {
        &self.url_key
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }
}
