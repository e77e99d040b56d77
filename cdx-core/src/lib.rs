//! Core value types for CDX records.
//!
//! This crate provides the foundational types shared by the cdx crates:
//! - Capture timestamps with temporal-distance arithmetic
//! - Type-safe field names
//! - CDX records and legacy CDX line parsing

pub mod fields;
pub mod record;
pub mod timestamp;

pub use fields::FieldName;
pub use record::{CdxFormat, CdxRecord, LineParseError, RecordError};
pub use timestamp::{CaptureTimestamp, TimestampParseError};
