//! Type-safe wrappers for CDX field names.
//!
//! Records are addressed by field name (e.g. "urlkey", "timestamp") rather
//! than by position, so the well-known names live here as constructors
//! instead of being scattered around as string literals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A CDX field name (e.g. "urlkey", "timestamp", "mimetype").
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub struct FieldName(String);

impl FieldName {
    /// Create a new FieldName without validation.
    ///
    /// Use this when you know the string is a valid field name
    /// (e.g., from trusted sources like hardcoded constants).
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create a FieldName with validation.
    ///
    /// Returns None if the name is empty or contains whitespace.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() || name.contains(char::is_whitespace) {
            None
        } else {
            Some(Self(name))
        }
    }

    /// Get the field name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the inner String.
    pub fn into_inner(self) -> String {
        self.0
    }

    // Well-known CDX field names.

    /// The canonicalized (SURT) url key the index is sorted by.
    pub fn url_key() -> Self {
        Self::new_unchecked("urlkey")
    }

    /// The capture timestamp field.
    pub fn timestamp() -> Self {
        Self::new_unchecked("timestamp")
    }

    /// The originally requested url.
    pub fn original() -> Self {
        Self::new_unchecked("original")
    }

    pub fn mimetype() -> Self {
        Self::new_unchecked("mimetype")
    }

    pub fn status_code() -> Self {
        Self::new_unchecked("statuscode")
    }

    pub fn digest() -> Self {
        Self::new_unchecked("digest")
    }

    pub fn redirect() -> Self {
        Self::new_unchecked("redirect")
    }

    pub fn robot_flags() -> Self {
        Self::new_unchecked("robotflags")
    }

    /// Compressed record size in the archive file.
    pub fn length() -> Self {
        Self::new_unchecked("length")
    }

    /// Compressed offset into the archive file.
    pub fn offset() -> Self {
        Self::new_unchecked("offset")
    }

    /// Name of the archive file holding the capture.
    pub fn filename() -> Self {
        Self::new_unchecked("filename")
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<FieldName> for String {
    fn from(name: FieldName) -> String {
        name.into_inner()
    }
}
