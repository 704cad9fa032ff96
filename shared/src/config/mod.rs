//! Configuration module for Insight.
//!
//! This module contains configuration structures for query execution.

pub mod query;

pub use query::{QueryConfig, DEFAULT_MAX_RESULT_ROWS};
