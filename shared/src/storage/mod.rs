//! Storage traits and implementations.
//!
//! This module provides the dataset registry the query engine reads from.
//! The `DatasetStore` trait defines the interface, allowing different
//! implementations (in-memory, disk-backed, etc.).

pub mod dataset_store;

pub use dataset_store::{
    validate_dataset_id, DatasetStore, DatasetStoreError, InMemoryDatasetStore,
};
