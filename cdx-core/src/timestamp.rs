//! Capture timestamps and temporal distance.
//!
//! CDX records carry their capture time as a fixed-width 14-digit string
//! (`yyyymmddhhmmss`, UTC). [`CaptureTimestamp`] is the parsed, totally
//! ordered form of that field. Distances between two captures are expressed
//! as a [`TimeDelta`], which compares totally (no NaN-like cases).

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Width of the canonical textual form.
const TIMESTAMP_WIDTH: usize = 14;

/// Errors producing a [`CaptureTimestamp`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampParseError {
    #[error("capture timestamp must be {TIMESTAMP_WIDTH} digits, got {0} bytes")]
    Length(usize),

    #[error("capture timestamp contains a non-digit byte at position {0}")]
    NonDigit(usize),

    #[error("capture timestamp has no calendar meaning: {0}")]
    OutOfRange(String),
}

/// The point in time a record was captured.
///
/// Immutable once parsed. CDX timestamps carry no zone designator and are
/// UTC by convention, so the wrapped value is a naive datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaptureTimestamp(NaiveDateTime);

impl CaptureTimestamp {
    /// Parse the canonical 14-digit `yyyymmddhhmmss` form.
    ///
    /// The grammar is strict: exactly 14 ASCII digits, and the components
    /// must name a real calendar instant (no month 13, no Feb 30, no
    /// hour 24).
    pub fn parse(text: &str) -> Result<Self, TimestampParseError> {
        let bytes = text.as_bytes();
        if bytes.len() != TIMESTAMP_WIDTH {
            return Err(TimestampParseError::Length(bytes.len()));
        }
        if let Some(pos) = bytes.iter().position(|b| !b.is_ascii_digit()) {
            return Err(TimestampParseError::NonDigit(pos));
        }

        // All digits at this point, so plain accumulation cannot overflow u32.
        let num = |range: Range<usize>| {
            bytes[range]
                .iter()
                .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
        };

        let (year, month, day) = (num(0..4) as i32, num(4..6), num(6..8));
        let (hour, minute, second) = (num(8..10), num(10..12), num(12..14));

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            TimestampParseError::OutOfRange(format!("{year:04}-{month:02}-{day:02}"))
        })?;
        let datetime = date.and_hms_opt(hour, minute, second).ok_or_else(|| {
            TimestampParseError::OutOfRange(format!("{hour:02}:{minute:02}:{second:02}"))
        })?;

        Ok(Self(datetime))
    }

    /// Absolute temporal distance to another capture.
    ///
    /// Symmetric and non-negative: `a.distance_to(b) == b.distance_to(a)`.
    pub fn distance_to(&self, other: &CaptureTimestamp) -> TimeDelta {
        (self.0 - other.0).abs()
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d%H%M%S"))
    }
}

impl FromStr for CaptureTimestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
