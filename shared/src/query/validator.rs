//! Semantic validation of parsed queries.
//!
//! Runs after parsing and before any data access. Checks are applied in
//! document order (WHERE, then OPTIONS, then TRANSFORMATIONS) and the first
//! violation is reported.

use super::ast::{ApplyToken, Filter, LogicalOp, Options, Order, Query, Transform};
use std::collections::HashSet;
use thiserror::Error;

/// A well-formed query that is logically invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `AND`/`OR` with no operands.
    #[error("{0} must have at least one filter")]
    EmptyLogic(LogicalOp),

    /// A comparison names an empty field.
    #[error("Comparison field must not be empty")]
    EmptyField,

    /// A numeric literal is NaN or infinite.
    #[error("The value for {0} must be a finite number")]
    NonFiniteLiteral(String),

    /// No columns requested.
    #[error("COLUMNS must be a non-empty array")]
    EmptyColumns,

    /// An ORDER key is not projected.
    #[error("ORDER key '{0}' must be one of the COLUMNS")]
    OrderNotInColumns(String),

    /// A structured ORDER without keys.
    #[error("ORDER keys must be a non-empty array")]
    EmptyOrderKeys,

    /// A TRANSFORMATIONS block without group keys.
    #[error("GROUP must be a non-empty array")]
    EmptyGroup,

    /// Two APPLY rules share an output key.
    #[error("Each APPLY key must be unique. Duplicate found: {0}")]
    DuplicateApplyKey(String),

    /// An APPLY output key that is empty or namespaced.
    #[error("APPLY key '{0}' must be non-empty and must not contain an underscore")]
    InvalidApplyKey(String),

    /// An APPLY token outside MAX, MIN, AVG, SUM and COUNT.
    #[error("Invalid APPLY token: {0}")]
    InvalidApplyToken(String),

    /// A projected column that is neither grouped nor aggregated.
    #[error("Column '{0}' must be a GROUP key or an APPLY key when TRANSFORMATIONS is present")]
    ColumnNotGrouped(String),
}

/// Validates a parsed query.
///
/// # Errors
///
/// Returns the first `ValidationError` found, walking WHERE, then OPTIONS,
/// then TRANSFORMATIONS.
pub fn validate_query(query: &Query) -> Result<(), ValidationError> {
    validate_filter(&query.filter)?;
    validate_options(&query.options)?;
    if let Some(ref transform) = query.transform {
        validate_transform(transform, &query.options.columns)?;
    }
    Ok(())
}

fn validate_filter(filter: &Filter) -> Result<(), ValidationError> {
    match filter {
        Filter::All => Ok(()),
        Filter::Logic { op, operands } => {
            if operands.is_empty() {
                return Err(ValidationError::EmptyLogic(*op));
            }
            operands.iter().try_for_each(validate_filter)
        }
        Filter::Numeric { field, value, .. } => {
            if field.is_empty() {
                return Err(ValidationError::EmptyField);
            }
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteLiteral(field.clone()));
            }
            Ok(())
        }
        Filter::Text { field, .. } => {
            if field.is_empty() {
                return Err(ValidationError::EmptyField);
            }
            Ok(())
        }
        Filter::Not(inner) => validate_filter(inner),
    }
}

fn validate_options(options: &Options) -> Result<(), ValidationError> {
    if options.columns.is_empty() {
        return Err(ValidationError::EmptyColumns);
    }

    match options.order {
        None => Ok(()),
        Some(Order::Keys { ref keys, .. }) if keys.is_empty() => {
            Err(ValidationError::EmptyOrderKeys)
        }
        Some(ref order) => {
            let (_, keys) = order.parts();
            match keys.iter().find(|key| !options.columns.contains(*key)) {
                Some(missing) => Err(ValidationError::OrderNotInColumns(missing.clone())),
                None => Ok(()),
            }
        }
    }
}

fn validate_transform(transform: &Transform, columns: &[String]) -> Result<(), ValidationError> {
    if transform.group_by.is_empty() {
        return Err(ValidationError::EmptyGroup);
    }

    let mut seen = HashSet::new();
    for rule in &transform.apply {
        if !seen.insert(rule.output_key.as_str()) {
            return Err(ValidationError::DuplicateApplyKey(rule.output_key.clone()));
        }
        if rule.output_key.is_empty() || rule.output_key.contains('_') {
            return Err(ValidationError::InvalidApplyKey(rule.output_key.clone()));
        }
        if let ApplyToken::Unknown(ref token) = rule.token {
            return Err(ValidationError::InvalidApplyToken(token.clone()));
        }
    }

    for column in columns {
        if !transform.group_by.contains(column) && !seen.contains(column.as_str()) {
            return Err(ValidationError::ColumnNotGrouped(column.clone()));
        }
    }

    Ok(())
}
