//! The attribute-access capability shared by every record kind.

use super::value::AttrRef;
use thiserror::Error;

/// Read-only attribute access for a single dataset row.
///
/// Each record kind enumerates its own fixed attribute set; unknown attribute
/// names resolve to `None`. Implementations must be pure.
pub trait Record: std::fmt::Debug + Send + Sync {
    /// Returns the value of `attribute`, or `None` if the record has no such attribute.
    fn get(&self, attribute: &str) -> Option<AttrRef<'_>>;
}

/// Errors raised while building records from ingested rows.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A year could not be read as a number.
    #[error("Invalid year value: '{0}'")]
    InvalidYear(String),

    /// Field-level validation failed.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// The row does not have the record's JSON shape.
    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}
