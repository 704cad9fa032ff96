//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::config::QueryConfig;
use shared::storage::{DatasetStore, InMemoryDatasetStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Holds the dataset registry and the query limits.
#[derive(Clone)]
pub struct AppState {
    /// The dataset registry.
    dataset_store: Arc<dyn DatasetStore>,
    /// Limits applied to every query.
    query_config: QueryConfig,
}

impl AppState {
    /// Creates a new application state with the given store and query limits.
    pub fn new(dataset_store: Arc<dyn DatasetStore>, query_config: QueryConfig) -> Self {
        Self {
            dataset_store,
            query_config,
        }
    }

    /// Creates a new application state with an empty in-memory registry.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::new(
            Arc::new(InMemoryDatasetStore::new()),
            QueryConfig::default(),
        )
    }

    /// Replaces the query limits.
    #[must_use]
    pub fn with_query_config(mut self, query_config: QueryConfig) -> Self {
        self.query_config = query_config;
        self
    }

    /// Returns a reference to the dataset registry.
    #[must_use]
    pub fn dataset_store(&self) -> &dyn DatasetStore {
        self.dataset_store.as_ref()
    }

    /// Returns the query limits.
    #[must_use]
    pub const fn query_config(&self) -> &QueryConfig {
        &self.query_config
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
