//! Unified query error and its caller-facing category.

use super::executor::ExecutionError;
use super::parser::ParseError;
use super::validator::ValidationError;
use thiserror::Error;

/// Any failure of the query pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The query is well-formed but logically invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The query failed while running.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// The error categories callers can distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Malformed query shape.
    Structural,
    /// Well-formed but logically invalid query, or an internal failure.
    Semantic,
    /// The referenced dataset is not loaded.
    NotFound,
    /// A valid query whose result exceeds the row ceiling.
    ResultTooLarge,
    /// A record lacks, or mistypes, an attribute the query uses.
    Execution,
}

impl QueryErrorKind {
    /// Returns the wire code for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural_error",
            Self::Semantic => "semantic_error",
            Self::NotFound => "not_found",
            Self::ResultTooLarge => "result_too_large",
            Self::Execution => "execution_error",
        }
    }
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl QueryError {
    /// Returns the category of the error.
    #[must_use]
    pub fn kind(&self) -> QueryErrorKind {
        match self {
            Self::Parse(_) => QueryErrorKind::Structural,
            Self::Validation(_) => QueryErrorKind::Semantic,
            Self::Execution(e) => match e {
                ExecutionError::DatasetNotFound(_) => QueryErrorKind::NotFound,
                ExecutionError::ResultTooLarge { .. } => QueryErrorKind::ResultTooLarge,
                ExecutionError::MissingAttribute(_)
                | ExecutionError::TypeMismatch { .. } => QueryErrorKind::Execution,
                ExecutionError::NoDatasetReferenced
                | ExecutionError::MultipleDatasets(_)
                | ExecutionError::Storage(_)
                | ExecutionError::UnknownColumn(_)
                | ExecutionError::EmptyGroup(_)
                | ExecutionError::UnsupportedAggregation(_) => QueryErrorKind::Semantic,
            },
        }
    }
}
