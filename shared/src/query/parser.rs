//! JSON query parser.
//!
//! Converts an untyped JSON document into a [`Query`], checking shape only:
//! node kinds, value types, and array/object cardinality. Cross-field rules
//! (order keys vs. columns, apply-key uniqueness, dataset namespaces) are left
//! to the validator and executor.
//!
//! Parses documents like:
//! - `{"WHERE": {}, "OPTIONS": {"COLUMNS": ["courses_dept"]}}`
//! - `{"WHERE": {"GT": {"courses_avg": 97}}, "OPTIONS": {"COLUMNS": ["courses_dept"], "ORDER": "courses_dept"}}`
//! - `{"WHERE": {"IS": {"rooms_shortname": "DMP"}}, "OPTIONS": {...}, "TRANSFORMATIONS": {...}}`

use super::ast::{
    ApplyRule, ApplyToken, ComparisonOp, Filter, LogicalOp, Options, Order, Pattern, Query,
    SortDirection, Transform,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during query parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input is not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A clause that must be an object is something else.
    #[error("{0} must be an object")]
    NotAnObject(&'static str),

    /// A required key is absent.
    #[error("Missing required key: {0}")]
    MissingKey(&'static str),

    /// A filter node has an unrecognized key.
    #[error("Invalid filter type: '{0}'")]
    UnknownFilter(String),

    /// A filter node is malformed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The OPTIONS block is malformed.
    #[error("Invalid OPTIONS: {0}")]
    InvalidOptions(String),

    /// The TRANSFORMATIONS block is malformed.
    #[error("Invalid TRANSFORMATIONS: {0}")]
    InvalidTransformations(String),
}

/// Parses a JSON query document into a Query AST.
///
/// # Errors
///
/// Returns a `ParseError` if:
/// - The document is not an object, or `WHERE`/`OPTIONS` are missing or not objects
/// - A filter node has zero keys inside a logic array, more than one key, or an unknown key
/// - Comparison operands have the wrong shape or value type
/// - `COLUMNS`, `ORDER`, `GROUP` or `APPLY` are malformed
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shared::query::{parse_query, Filter};
///
/// let query = parse_query(&json!({
///     "WHERE": {},
///     "OPTIONS": {"COLUMNS": ["courses_dept"]}
/// }))
/// .unwrap();
/// assert_eq!(query.filter, Filter::All);
/// assert!(query.transform.is_none());
/// ```
pub fn parse_query(input: &Value) -> Result<Query, ParseError> {
    let map = input.as_object().ok_or(ParseError::NotAnObject("Query"))?;

    let where_clause = map.get("WHERE").ok_or(ParseError::MissingKey("WHERE"))?;
    if !where_clause.is_object() {
        return Err(ParseError::NotAnObject("WHERE"));
    }
    let filter = filter(where_clause)?;

    let options = options(map.get("OPTIONS").ok_or(ParseError::MissingKey("OPTIONS"))?)?;

    let transform = map
        .get("TRANSFORMATIONS")
        .map(transformations)
        .transpose()?;

    Ok(Query {
        filter,
        options,
        transform,
    })
}

/// Parses a JSON query string into a Query AST.
///
/// # Errors
///
/// Returns `ParseError::InvalidJson` if the text is not JSON, otherwise the
/// errors of [`parse_query`].
pub fn parse_query_str(input: &str) -> Result<Query, ParseError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    parse_query(&value)
}

// ============================================================================
// WHERE clause parser
// ============================================================================

fn filter(value: &Value) -> Result<Filter, ParseError> {
    let map = value
        .as_object()
        .ok_or_else(|| ParseError::InvalidFilter(format!("expected an object, found {value}")))?;

    let Some((key, body)) = single_entry(map)? else {
        return Ok(Filter::All);
    };

    match key.as_str() {
        "AND" => logic(LogicalOp::And, body),
        "OR" => logic(LogicalOp::Or, body),
        "LT" => numeric(ComparisonOp::Lt, body),
        "GT" => numeric(ComparisonOp::Gt, body),
        "EQ" => numeric(ComparisonOp::Eq, body),
        "IS" => text(body),
        "NOT" => {
            if !body.is_object() {
                return Err(ParseError::InvalidFilter(
                    "NOT value must be a filter object".to_string(),
                ));
            }
            Ok(Filter::not(nested("NOT", body)?))
        }
        other => Err(ParseError::UnknownFilter(other.to_string())),
    }
}

/// Returns the only entry of a filter node, `None` for `{}`.
fn single_entry(map: &Map<String, Value>) -> Result<Option<(&String, &Value)>, ParseError> {
    if map.len() > 1 {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        return Err(ParseError::InvalidFilter(format!(
            "a filter must have exactly one key, found [{}]",
            keys.join(", ")
        )));
    }
    Ok(map.iter().next())
}

fn logic(op: LogicalOp, body: &Value) -> Result<Filter, ParseError> {
    let operands = body
        .as_array()
        .filter(|operands| !operands.is_empty())
        .ok_or_else(|| ParseError::InvalidFilter(format!("{op} must be a non-empty array")))?;

    let context = op.to_string();
    let operands = operands
        .iter()
        .map(|operand| nested(&context, operand))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Filter::Logic { op, operands })
}

/// Parses a filter nested under `context`; `{}` is only valid as the whole WHERE.
fn nested(context: &str, body: &Value) -> Result<Filter, ParseError> {
    let parsed = filter(body)?;
    if parsed == Filter::All {
        return Err(ParseError::InvalidFilter(format!(
            "{context} cannot contain an empty filter"
        )));
    }
    Ok(parsed)
}

/// Unpacks a comparison body of the form `{field: value}`.
fn comparison_pair<'a>(
    name: &str,
    body: &'a Value,
) -> Result<(&'a String, &'a Value), ParseError> {
    body.as_object()
        .filter(|pair| pair.len() == 1)
        .and_then(|pair| pair.iter().next())
        .ok_or_else(|| {
            ParseError::InvalidFilter(format!("{name} must have exactly one field/value pair"))
        })
}

fn numeric(op: ComparisonOp, body: &Value) -> Result<Filter, ParseError> {
    let (field, value) = comparison_pair(&op.to_string(), body)?;
    let value = value.as_f64().ok_or_else(|| {
        ParseError::InvalidFilter(format!("value for {field} in {op} must be a number"))
    })?;
    Ok(Filter::numeric(op, field.clone(), value))
}

fn text(body: &Value) -> Result<Filter, ParseError> {
    let (field, value) = comparison_pair("IS", body)?;
    let pattern = value.as_str().ok_or_else(|| {
        ParseError::InvalidFilter(format!("value for {field} in IS must be a string"))
    })?;
    Ok(Filter::Text {
        field: field.clone(),
        pattern: Pattern::new(pattern),
    })
}

// ============================================================================
// OPTIONS parser
// ============================================================================

fn options(value: &Value) -> Result<Options, ParseError> {
    let map = value.as_object().ok_or(ParseError::NotAnObject("OPTIONS"))?;

    let columns = map
        .get("COLUMNS")
        .ok_or_else(|| ParseError::InvalidOptions("COLUMNS is missing".to_string()))?;
    let columns = string_array(columns)
        .filter(|columns| !columns.is_empty())
        .ok_or_else(|| {
            ParseError::InvalidOptions("COLUMNS must be a non-empty array of strings".to_string())
        })?;

    let order = map.get("ORDER").map(order).transpose()?;

    Ok(Options { columns, order })
}

fn order(value: &Value) -> Result<Order, ParseError> {
    match value {
        Value::String(column) => Ok(Order::Column(column.clone())),
        Value::Object(map) => {
            let direction = match map.get("dir").and_then(Value::as_str) {
                Some("UP") => SortDirection::Up,
                Some("DOWN") => SortDirection::Down,
                _ => {
                    return Err(ParseError::InvalidOptions(
                        "ORDER dir must be UP or DOWN".to_string(),
                    ))
                }
            };
            let keys = map
                .get("keys")
                .and_then(string_array)
                .filter(|keys| !keys.is_empty())
                .ok_or_else(|| {
                    ParseError::InvalidOptions(
                        "ORDER keys must be a non-empty array of strings".to_string(),
                    )
                })?;
            Ok(Order::Keys { direction, keys })
        }
        _ => Err(ParseError::InvalidOptions(
            "ORDER must be a string or an object with dir and keys".to_string(),
        )),
    }
}

/// Returns the elements of a JSON array of strings, or `None` for any other shape.
fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

// ============================================================================
// TRANSFORMATIONS parser
// ============================================================================

fn transformations(value: &Value) -> Result<Transform, ParseError> {
    let map = value
        .as_object()
        .ok_or(ParseError::NotAnObject("TRANSFORMATIONS"))?;

    let group_by = map
        .get("GROUP")
        .and_then(string_array)
        .filter(|group| !group.is_empty())
        .ok_or_else(|| {
            ParseError::InvalidTransformations(
                "GROUP must be a non-empty array of strings".to_string(),
            )
        })?;

    let apply = map
        .get("APPLY")
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::InvalidTransformations("APPLY must be an array".to_string()))?
        .iter()
        .map(apply_rule)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Transform { group_by, apply })
}

fn apply_rule(value: &Value) -> Result<ApplyRule, ParseError> {
    let malformed = || {
        ParseError::InvalidTransformations(format!(
            "APPLY rule must have the shape {{applyKey: {{TOKEN: field}}}}, found {value}"
        ))
    };

    let (output_key, body) = value
        .as_object()
        .filter(|rule| rule.len() == 1)
        .and_then(|rule| rule.iter().next())
        .ok_or_else(malformed)?;
    let (token, field) = body
        .as_object()
        .filter(|body| body.len() == 1)
        .and_then(|body| body.iter().next())
        .ok_or_else(malformed)?;
    let field = field.as_str().ok_or_else(malformed)?;

    Ok(ApplyRule::new(
        output_key.clone(),
        ApplyToken::from_token(token),
        field,
    ))
}
