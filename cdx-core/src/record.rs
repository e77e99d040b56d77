//! CDX records and legacy CDX line parsing.
//!
//! A record is a read-only set of named fields. Records typically originate
//! from legacy space-delimited CDX lines, whose layout is described by a
//! format header of single-letter field codes (e.g. `CDX N b a m s k r M S V g`).

use crate::fields::FieldName;
use crate::timestamp::{CaptureTimestamp, TimestampParseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder for an unset field in a CDX line.
const UNSET: &str = "-";

/// Errors reading a field out of a [`CdxRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record has no {0} field")]
    MissingField(FieldName),

    #[error("record {field} field is not a valid capture timestamp: {source}")]
    Timestamp {
        field: FieldName,
        source: TimestampParseError,
    },
}

/// Errors parsing CDX format headers and lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineParseError {
    #[error("not a CDX format header: {0:?}")]
    NotAHeader(String),

    #[error("unknown CDX field code {0:?}")]
    UnknownFieldCode(char),

    #[error("CDX line has {found} fields, format expects {expected}")]
    FieldCount { expected: usize, found: usize },
}

/// Field layout of a legacy CDX file, parsed from its format header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdxFormat {
    fields: Vec<FieldName>,
}

impl CdxFormat {
    /// Parse a format header like ` CDX N b a m s k r M S V g`.
    ///
    /// The header may start with an optional space followed by the literal
    /// `CDX`; the remaining tokens are single-letter field codes.
    pub fn parse(header: &str) -> Result<Self, LineParseError> {
        let mut tokens = header.split_ascii_whitespace();
        if tokens.next() != Some("CDX") {
            return Err(LineParseError::NotAHeader(header.to_string()));
        }

        let mut fields = Vec::new();
        for token in tokens {
            let mut chars = token.chars();
            let code = chars
                .next()
                .ok_or_else(|| LineParseError::NotAHeader(header.to_string()))?;
            if chars.next().is_some() {
                return Err(LineParseError::NotAHeader(header.to_string()));
            }
            fields.push(field_for_code(code)?);
        }

        Ok(Self { fields })
    }

    /// The standard 11-field layout (`CDX N b a m s k r M S V g`).
    pub fn cdx11() -> Self {
        Self {
            fields: vec![
                FieldName::url_key(),
                FieldName::timestamp(),
                FieldName::original(),
                FieldName::mimetype(),
                FieldName::status_code(),
                FieldName::digest(),
                FieldName::redirect(),
                FieldName::robot_flags(),
                FieldName::length(),
                FieldName::offset(),
                FieldName::filename(),
            ],
        }
    }

    /// Field names in positional order.
    pub fn fields(&self) -> &[FieldName] {
        &self.fields
    }
}

/// Map a legacy single-letter CDX field code to its field name.
fn field_for_code(code: char) -> Result<FieldName, LineParseError> {
    let field = match code {
        'N' => FieldName::url_key(),
        'b' => FieldName::timestamp(),
        'a' => FieldName::original(),
        'm' => FieldName::mimetype(),
        's' => FieldName::status_code(),
        'k' => FieldName::digest(),
        'r' => FieldName::redirect(),
        'M' => FieldName::robot_flags(),
        'S' => FieldName::length(),
        'V' => FieldName::offset(),
        'g' => FieldName::filename(),
        other => return Err(LineParseError::UnknownFieldCode(other)),
    };
    Ok(field)
}

/// A read-only archival index record.
///
/// Records own their field values; lookups borrow from the record. The
/// number of fields per record is small (the standard layout has 11), so
/// fields are kept as an ordered list rather than a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdxRecord {
    fields: Vec<(FieldName, String)>,
}

impl CdxRecord {
    /// Create a record from named fields.
    pub fn new(fields: Vec<(FieldName, String)>) -> Self {
        Self { fields }
    }

    /// Parse a space-delimited CDX line against a format.
    ///
    /// `-` marks an unset field and produces no entry in the record.
    pub fn parse_line(line: &str, format: &CdxFormat) -> Result<Self, LineParseError> {
        let values: Vec<&str> = line.split_ascii_whitespace().collect();
        if values.len() != format.fields().len() {
            return Err(LineParseError::FieldCount {
                expected: format.fields().len(),
                found: values.len(),
            });
        }

        let fields = format
            .fields()
            .iter()
            .zip(values)
            .filter(|(_, value)| *value != UNSET)
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        Ok(Self { fields })
    }

    /// Look up a field's raw text by name.
    pub fn get(&self, field: &FieldName) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Parse the record's capture timestamp from the well-known timestamp
    /// field.
    ///
    /// Absence and malformation both surface as errors; a record without a
    /// readable capture time has no place on a time axis.
    pub fn capture_timestamp(&self) -> Result<CaptureTimestamp, RecordError> {
        let field = FieldName::timestamp();
        let raw = self
            .get(&field)
            .ok_or_else(|| RecordError::MissingField(field.clone()))?;
        CaptureTimestamp::parse(raw).map_err(|source| RecordError::Timestamp { field, source })
    }

    /// Iterate over all fields in record order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.fields.iter().map(|(name, value)| (name, value.as_str()))
    }
}
