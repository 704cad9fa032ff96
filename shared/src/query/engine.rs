//! The query pipeline: parse, validate, execute.

use super::error::QueryError;
use super::executor::{execute_query, ResultRow};
use super::parser::parse_query;
use super::validator::validate_query;
use crate::config::QueryConfig;
use crate::storage::DatasetStore;
use serde_json::Value;

/// Runs a raw JSON query against the datasets in `store`.
///
/// # Errors
///
/// Returns the first failure of any stage; no partial result is produced.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use shared::config::QueryConfig;
/// use shared::models::{Dataset, Section};
/// use shared::query::perform_query;
/// use shared::storage::{DatasetStore, InMemoryDatasetStore};
///
/// let store = InMemoryDatasetStore::new();
/// store
///     .add(Dataset::from_sections(
///         "courses",
///         vec![Section::new("1", "310", "software", "jane", "cpsc", 2015, 98.0)],
///     ))
///     .unwrap();
///
/// let rows = perform_query(
///     &json!({"WHERE": {"GT": {"courses_avg": 97}}, "OPTIONS": {"COLUMNS": ["courses_dept"]}}),
///     &store,
///     &QueryConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(serde_json::to_value(&rows).unwrap(), json!([{"courses_dept": "cpsc"}]));
/// ```
pub fn perform_query(
    raw: &Value,
    store: &dyn DatasetStore,
    config: &QueryConfig,
) -> Result<Vec<ResultRow>, QueryError> {
    let query = parse_query(raw)?;
    tracing::debug!(query = %query, "Query parsed");

    validate_query(&query)?;

    Ok(execute_query(&query, store, config)?)
}
