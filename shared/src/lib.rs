//! Insight Shared Library
//!
//! This crate contains the record models, the dataset registry, and the query
//! engine used by the Insight API server and CLI.
//!
//! # Modules
//!
//! - [`models`] - Course sections, rooms, and datasets
//! - [`storage`] - The dataset registry
//! - [`query`] - JSON query parsing, validation, and execution
//! - [`config`] - Query execution limits
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shared::config::QueryConfig;
//! use shared::models::{Dataset, Section};
//! use shared::query::perform_query;
//! use shared::storage::{DatasetStore, InMemoryDatasetStore};
//!
//! let store = InMemoryDatasetStore::new();
//! store
//!     .add(Dataset::from_sections(
//!         "courses",
//!         vec![
//!             Section::new("1", "310", "software", "jane", "cpsc", 2015, 90.0),
//!             Section::new("2", "310", "software", "john", "cpsc", 2016, 80.0),
//!         ],
//!     ))
//!     .unwrap();
//!
//! let rows = perform_query(
//!     &json!({
//!         "WHERE": {},
//!         "OPTIONS": {"COLUMNS": ["courses_dept", "avgMark"]},
//!         "TRANSFORMATIONS": {
//!             "GROUP": ["courses_dept"],
//!             "APPLY": [{"avgMark": {"AVG": "courses_avg"}}]
//!         }
//!     }),
//!     &store,
//!     &QueryConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     serde_json::to_value(&rows).unwrap(),
//!     json!([{"courses_dept": "cpsc", "avgMark": 85}])
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod models;
pub mod query;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
