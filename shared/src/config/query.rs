//! Query execution limits.
//!
//! Query results are never truncated: a query whose result would exceed
//! `max_result_rows` is rejected as a whole.

use serde::{Deserialize, Serialize};

/// Default ceiling on the number of rows a single query may return.
pub const DEFAULT_MAX_RESULT_ROWS: usize = 5000;

/// Configuration passed to the query executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Maximum number of rows a result may contain.
    pub max_result_rows: usize,
}

impl QueryConfig {
    /// Creates a configuration with the given row ceiling.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::QueryConfig;
    ///
    /// let config = QueryConfig::new(100);
    /// assert_eq!(config.max_result_rows, 100);
    /// ```
    #[must_use]
    pub const fn new(max_result_rows: usize) -> Self {
        Self { max_result_rows }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the row ceiling is zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_result_rows == 0 {
            return Err("Result row limit must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULT_ROWS)
    }
}
