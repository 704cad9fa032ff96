//! Query execution engine.
//!
//! Executes validated queries against a dataset from the registry:
//! dataset resolution, filtering, optional grouping, projection, ordering and
//! the result-size check, in that order.

use super::aggregate::group_and_apply;
use super::ast::{Filter, LogicalOp, Order, Query, SortDirection};
use crate::config::QueryConfig;
use crate::models::{AttrRef, AttrValue, Dataset, Record};
use crate::storage::{DatasetStore, DatasetStoreError};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during query execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// No field in the query carries a dataset namespace.
    #[error("Query does not reference any dataset")]
    NoDatasetReferenced,

    /// Fields from more than one dataset are referenced.
    #[error("Query must reference a single dataset, found: {}", .0.join(", "))]
    MultipleDatasets(Vec<String>),

    /// The referenced dataset is not loaded.
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(String),

    /// The registry failed while resolving the dataset.
    #[error("Storage error: {0}")]
    Storage(DatasetStoreError),

    /// A projected, grouped or aggregated field names nothing the dataset's kind defines.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// A record has no value for a referenced attribute.
    #[error("Attribute '{0}' is not defined on records of the dataset")]
    MissingAttribute(String),

    /// An attribute has the wrong type for the operation.
    #[error("Type mismatch: {field} is a {found}, expected a {expected}")]
    TypeMismatch {
        /// The referenced field.
        field: String,
        /// The type the operation needs.
        expected: &'static str,
        /// The type found on the record.
        found: &'static str,
    },

    /// An aggregation was asked for over an empty group.
    #[error("Cannot compute {0} over an empty group")]
    EmptyGroup(String),

    /// An APPLY token the executor does not implement.
    #[error("Unsupported APPLY token: {0}")]
    UnsupportedAggregation(String),

    /// The result has more rows than the configured ceiling.
    #[error("Query result has {rows} rows, exceeding the limit of {limit}")]
    ResultTooLarge {
        /// Rows the query produced.
        rows: usize,
        /// The configured ceiling.
        limit: usize,
    },
}

/// One row of a query result: column/value pairs in `COLUMNS` order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    values: Vec<(String, AttrValue)>,
}

impl ResultRow {
    /// Creates an empty row with room for `capacity` columns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, value: AttrValue) {
        self.values.push((column.into(), value));
    }

    /// Returns the value of `column`, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&AttrValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the column/value pairs in order.
    #[must_use]
    pub fn values(&self) -> &[(String, AttrValue)] {
        &self.values
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in &self.values {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Executes a validated query against the store.
///
/// # Errors
///
/// Returns an error if the dataset cannot be resolved, a record lacks a
/// referenced attribute, a column is unknown, or the result exceeds
/// `config.max_result_rows`.
pub fn execute_query(
    query: &Query,
    store: &dyn DatasetStore,
    config: &QueryConfig,
) -> Result<Vec<ResultRow>, ExecutionError> {
    let dataset_id = extract_dataset_id(query)?;
    let dataset = store.get(&dataset_id).map_err(|e| match e {
        DatasetStoreError::NotFound(id) => ExecutionError::DatasetNotFound(id),
        other => ExecutionError::Storage(other),
    })?;
    tracing::debug!(dataset = %dataset_id, records = dataset.len(), "Dataset resolved");

    let matched = filter_records(&dataset, &query.filter)?;
    tracing::debug!(dataset = %dataset_id, matched = matched.len(), "Filter applied");

    let columns = &query.options.columns;
    let mut rows = match query.transform {
        Some(ref transform) => {
            for field in transform
                .group_by
                .iter()
                .chain(transform.apply.iter().map(|rule| &rule.field))
            {
                known_field(&dataset, field)?;
            }
            let groups = group_and_apply(&matched, transform)?;
            tracing::debug!(dataset = %dataset_id, groups = groups.len(), "Groups aggregated");
            project_groups(&groups, columns)?
        }
        None => project_records(&matched, &dataset, columns)?,
    };

    if let Some(ref order) = query.options.order {
        sort_rows(&mut rows, order);
    }

    if rows.len() > config.max_result_rows {
        return Err(ExecutionError::ResultTooLarge {
            rows: rows.len(),
            limit: config.max_result_rows,
        });
    }

    tracing::debug!(dataset = %dataset_id, rows = rows.len(), "Query executed");
    Ok(rows)
}

/// Returns the single dataset id referenced by the query.
///
/// Collects the namespace prefix of every field in WHERE, COLUMNS, GROUP and
/// APPLY. Names without a namespace (apply output keys) are skipped.
///
/// # Errors
///
/// Returns `NoDatasetReferenced` or `MultipleDatasets` unless exactly one id
/// is found.
pub fn extract_dataset_id(query: &Query) -> Result<String, ExecutionError> {
    let mut ids = BTreeSet::new();
    let mut collect = |field: &str| {
        if let Some((id, _)) = field.split_once('_') {
            ids.insert(id.to_string());
        }
    };

    query.filter.visit_fields(&mut collect);
    for column in &query.options.columns {
        collect(column.as_str());
    }
    if let Some(ref transform) = query.transform {
        for key in &transform.group_by {
            collect(key.as_str());
        }
        for rule in &transform.apply {
            collect(rule.field.as_str());
        }
    }

    let mut ids = ids.into_iter();
    match (ids.next(), ids.next()) {
        (None, _) => Err(ExecutionError::NoDatasetReferenced),
        (Some(id), None) => Ok(id),
        (Some(first), Some(second)) => {
            let mut all = vec![first, second];
            all.extend(ids);
            Err(ExecutionError::MultipleDatasets(all))
        }
    }
}

/// Evaluates a filter against a single record.
///
/// # Errors
///
/// Returns an error if a compared attribute is missing from the record or
/// has the wrong type.
pub fn evaluate(record: &dyn Record, filter: &Filter) -> Result<bool, ExecutionError> {
    match filter {
        Filter::All => Ok(true),
        Filter::Logic {
            op: LogicalOp::And,
            operands,
        } => {
            for operand in operands {
                if !evaluate(record, operand)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Filter::Logic {
            op: LogicalOp::Or,
            operands,
        } => {
            for operand in operands {
                if evaluate(record, operand)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Filter::Numeric { op, field, value } => {
            Ok(op.compare(numeric_attribute(record, field)?, *value))
        }
        Filter::Text { field, pattern } => Ok(pattern.matches(text_attribute(record, field)?)),
        Filter::Not(inner) => Ok(!evaluate(record, inner)?),
    }
}

// ============================================================================
// Attribute access
// ============================================================================

/// Strips the dataset namespace from a field name.
fn attribute_name(field: &str) -> &str {
    field.split_once('_').map_or(field, |(_, attribute)| attribute)
}

/// Reads a namespaced field from a record.
pub(super) fn attribute<'r>(
    record: &'r dyn Record,
    field: &str,
) -> Result<AttrRef<'r>, ExecutionError> {
    record
        .get(attribute_name(field))
        .ok_or_else(|| ExecutionError::MissingAttribute(field.to_string()))
}

/// Reads a namespaced numeric field from a record.
pub(super) fn numeric_attribute(record: &dyn Record, field: &str) -> Result<f64, ExecutionError> {
    let value = attribute(record, field)?;
    value.as_number().ok_or(ExecutionError::TypeMismatch {
        field: field.to_string(),
        expected: "number",
        found: value.type_name(),
    })
}

fn text_attribute<'r>(record: &'r dyn Record, field: &str) -> Result<&'r str, ExecutionError> {
    let value = attribute(record, field)?;
    value.as_text().ok_or(ExecutionError::TypeMismatch {
        field: field.to_string(),
        expected: "string",
        found: value.type_name(),
    })
}

// ============================================================================
// Pipeline stages
// ============================================================================

fn filter_records<'d>(
    dataset: &'d Dataset,
    filter: &Filter,
) -> Result<Vec<&'d dyn Record>, ExecutionError> {
    if *filter == Filter::All {
        return Ok(dataset.records().collect());
    }

    let mut matched = Vec::new();
    for record in dataset.records() {
        if evaluate(record, filter)? {
            matched.push(record);
        }
    }
    Ok(matched)
}

/// Resolves a namespaced field to an attribute the dataset's kind defines.
fn known_field<'f>(dataset: &Dataset, field: &'f str) -> Result<&'f str, ExecutionError> {
    match field.split_once('_') {
        Some((id, attribute)) if id == dataset.id() && dataset.kind().has_attribute(attribute) => {
            Ok(attribute)
        }
        _ => Err(ExecutionError::UnknownColumn(field.to_string())),
    }
}

fn project_records(
    records: &[&dyn Record],
    dataset: &Dataset,
    columns: &[String],
) -> Result<Vec<ResultRow>, ExecutionError> {
    let attributes = columns
        .iter()
        .map(|column| known_field(dataset, column))
        .collect::<Result<Vec<_>, _>>()?;

    records
        .iter()
        .map(|record| {
            let mut row = ResultRow::with_capacity(columns.len());
            for (column, attribute) in columns.iter().zip(&attributes) {
                let value = record
                    .get(attribute)
                    .ok_or_else(|| ExecutionError::MissingAttribute(column.clone()))?;
                row.push(column.clone(), value.to_owned_value());
            }
            Ok(row)
        })
        .collect()
}

fn project_groups(
    groups: &[ResultRow],
    columns: &[String],
) -> Result<Vec<ResultRow>, ExecutionError> {
    groups
        .iter()
        .map(|group| {
            let mut row = ResultRow::with_capacity(columns.len());
            for column in columns {
                let value = group
                    .get(column)
                    .ok_or_else(|| ExecutionError::UnknownColumn(column.clone()))?;
                row.push(column.clone(), value.clone());
            }
            Ok(row)
        })
        .collect()
}

/// Stable multi-key sort; keys are compared left to right.
fn sort_rows(rows: &mut [ResultRow], order: &Order) {
    let (direction, keys) = order.parts();
    rows.sort_by(|a, b| {
        for key in keys {
            let ordering = match (a.get(key), b.get(key)) {
                (Some(x), Some(y)) => x.total_cmp(y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return match direction {
                    SortDirection::Up => ordering,
                    SortDirection::Down => ordering.reverse(),
                };
            }
        }
        Ordering::Equal
    });
}
