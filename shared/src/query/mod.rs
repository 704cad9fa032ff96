//! JSON query language for Insight.
//!
//! A query is a JSON document with a `WHERE` filter, `OPTIONS` (projected
//! columns and optional ordering) and optional `TRANSFORMATIONS` (grouping and
//! aggregation). Every field is namespaced with the id of the one dataset it
//! targets, e.g. `courses_avg`.
//!
//! # Example
//!
//! ```json
//! {
//!   "WHERE": {"AND": [{"GT": {"courses_avg": 90}}, {"IS": {"courses_dept": "cp*"}}]},
//!   "OPTIONS": {"COLUMNS": ["courses_dept", "maxAvg"], "ORDER": "maxAvg"},
//!   "TRANSFORMATIONS": {
//!     "GROUP": ["courses_dept"],
//!     "APPLY": [{"maxAvg": {"MAX": "courses_avg"}}]
//!   }
//! }
//! ```
//!
//! ```
//! use serde_json::json;
//! use shared::query::{parse_query, validate_query, Filter};
//!
//! let query = parse_query(&json!({
//!     "WHERE": {"IS": {"courses_dept": "cp*"}},
//!     "OPTIONS": {"COLUMNS": ["courses_dept"]}
//! }))
//! .unwrap();
//! assert_eq!(query.filter, Filter::is("courses_dept", "cp*"));
//! assert!(validate_query(&query).is_ok());
//! ```

mod aggregate;
mod ast;
mod engine;
mod error;
mod executor;
mod parser;
mod validator;

pub use ast::*;
pub use engine::perform_query;
pub use error::{QueryError, QueryErrorKind};
pub use executor::{evaluate, execute_query, extract_dataset_id, ExecutionError, ResultRow};
pub use parser::{parse_query, parse_query_str, ParseError};
pub use validator::{validate_query, ValidationError};
