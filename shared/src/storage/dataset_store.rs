//! Dataset registry trait and implementations.
//!
//! Provides the `DatasetStore` trait the query engine resolves datasets through,
//! and an `InMemoryDatasetStore` implementation.

use crate::models::{Dataset, DatasetInfo};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during dataset store operations.
#[derive(Debug, Error)]
pub enum DatasetStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on dataset store")]
    LockError,

    /// The dataset id is empty, whitespace-only, or contains an underscore.
    #[error("Invalid dataset id: '{0}'")]
    InvalidId(String),

    /// A dataset with this id is already loaded.
    #[error("Dataset '{0}' already exists")]
    AlreadyExists(String),

    /// No dataset with this id is loaded.
    #[error("Dataset '{0}' not found")]
    NotFound(String),

    /// The dataset holds no records.
    #[error("Dataset '{0}' contains no valid records")]
    EmptyDataset(String),
}

/// Checks that `id` can be used as a dataset id.
///
/// Ids are used as the `<id>_` field namespace in queries, so they must be
/// non-blank and cannot contain an underscore.
///
/// # Errors
///
/// Returns `DatasetStoreError::InvalidId` if the id is rejected.
pub fn validate_dataset_id(id: &str) -> Result<(), DatasetStoreError> {
    if id.trim().is_empty() || id.contains('_') {
        return Err(DatasetStoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Trait for dataset registries.
///
/// Datasets handed out by [`DatasetStore::get`] are immutable snapshots: removing
/// or replacing a dataset never affects a query already holding it.
/// Implementations must be thread-safe (Send + Sync).
pub trait DatasetStore: Send + Sync {
    /// Adds a dataset and returns the ids of all loaded datasets.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid or taken, or the dataset is empty.
    fn add(&self, dataset: Dataset) -> Result<Vec<String>, DatasetStoreError>;

    /// Removes a dataset and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid or no such dataset is loaded.
    fn remove(&self, id: &str) -> Result<String, DatasetStoreError>;

    /// Resolves a dataset by id.
    ///
    /// # Errors
    ///
    /// Returns `DatasetStoreError::NotFound` if no such dataset is loaded.
    fn get(&self, id: &str) -> Result<Arc<Dataset>, DatasetStoreError>;

    /// Lists loaded datasets, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self) -> Result<Vec<DatasetInfo>, DatasetStoreError>;
}

type Snapshot = Arc<BTreeMap<String, Arc<Dataset>>>;

/// In-memory dataset store.
///
/// Holds an immutable snapshot of the registry behind a `RwLock`. Writers copy
/// the map, apply their change, and publish the new snapshot; readers only ever
/// clone an `Arc`.
///
/// # Example
///
/// ```
/// use shared::models::{Dataset, Section};
/// use shared::storage::{DatasetStore, InMemoryDatasetStore};
///
/// let store = InMemoryDatasetStore::new();
/// let section = Section::new("1", "310", "sw eng", "holmes", "cpsc", 2015, 80.0);
/// let ids = store.add(Dataset::from_sections("courses", vec![section])).unwrap();
///
/// assert_eq!(ids, vec!["courses".to_string()]);
/// assert_eq!(store.get("courses").unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDatasetStore {
    datasets: RwLock<Snapshot>,
}

impl InMemoryDatasetStore {
    /// Creates a new empty in-memory dataset store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory dataset store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn snapshot(&self) -> Result<Snapshot, DatasetStoreError> {
        let datasets = self
            .datasets
            .read()
            .map_err(|_| DatasetStoreError::LockError)?;
        Ok(Arc::clone(&datasets))
    }
}

impl DatasetStore for InMemoryDatasetStore {
    fn add(&self, dataset: Dataset) -> Result<Vec<String>, DatasetStoreError> {
        validate_dataset_id(dataset.id())?;
        if dataset.is_empty() {
            return Err(DatasetStoreError::EmptyDataset(dataset.id().to_string()));
        }

        let mut datasets = self
            .datasets
            .write()
            .map_err(|_| DatasetStoreError::LockError)?;
        if datasets.contains_key(dataset.id()) {
            return Err(DatasetStoreError::AlreadyExists(dataset.id().to_string()));
        }

        let mut next = BTreeMap::clone(&datasets);
        tracing::info!(
            dataset = %dataset.id(),
            kind = %dataset.kind(),
            rows = dataset.len(),
            "Dataset added"
        );
        next.insert(dataset.id().to_string(), Arc::new(dataset));
        let ids = next.keys().cloned().collect();
        *datasets = Arc::new(next);

        Ok(ids)
    }

    fn remove(&self, id: &str) -> Result<String, DatasetStoreError> {
        validate_dataset_id(id)?;

        let mut datasets = self
            .datasets
            .write()
            .map_err(|_| DatasetStoreError::LockError)?;
        if !datasets.contains_key(id) {
            return Err(DatasetStoreError::NotFound(id.to_string()));
        }

        let mut next = BTreeMap::clone(&datasets);
        next.remove(id);
        *datasets = Arc::new(next);
        tracing::info!(dataset = %id, "Dataset removed");

        Ok(id.to_string())
    }

    fn get(&self, id: &str) -> Result<Arc<Dataset>, DatasetStoreError> {
        self.snapshot()?
            .get(id)
            .cloned()
            .ok_or_else(|| DatasetStoreError::NotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<DatasetInfo>, DatasetStoreError> {
        Ok(self.snapshot()?.values().map(|d| d.info()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatasetKind, Room, Section};

    fn sections(id: &str) -> Dataset {
        Dataset::from_sections(
            id,
            vec![
                Section::new("1", "310", "sw eng", "holmes", "cpsc", 2015, 80.0),
                Section::new("2", "200", "calculus", "smith", "math", 2016, 70.0),
            ],
        )
    }

    fn rooms(id: &str) -> Dataset {
        Dataset::from_rooms(
            id,
            vec![Room {
                fullname: "Hugh Dempster Pavilion".to_string(),
                shortname: "DMP".to_string(),
                number: "110".to_string(),
                name: "DMP_110".to_string(),
                address: "6245 Agronomy Road".to_string(),
                lat: 49.26,
                lon: -123.24,
                seats: 120,
                room_type: "Tiered Large Group".to_string(),
                furniture: "Classroom-Fixed Tablets".to_string(),
                href: String::new(),
            }],
        )
    }

    #[test]
    fn test_add_and_get() {
        let store = InMemoryDatasetStore::new();

        let ids = store.add(sections("courses")).unwrap();
        assert_eq!(ids, vec!["courses"]);

        let dataset = store.get("courses").unwrap();
        assert_eq!(dataset.kind(), DatasetKind::Sections);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_add_returns_all_ids_sorted() {
        let store = InMemoryDatasetStore::new();

        store.add(sections("sections")).unwrap();
        let ids = store.add(rooms("rooms")).unwrap();

        assert_eq!(ids, vec!["rooms", "sections"]);
    }

    #[test]
    fn test_add_rejects_invalid_ids() {
        let store = InMemoryDatasetStore::new();

        for id in ["", "   ", "my_courses"] {
            let result = store.add(sections(id));
            assert!(
                matches!(result, Err(DatasetStoreError::InvalidId(_))),
                "id {id:?} should be rejected"
            );
        }
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let store = InMemoryDatasetStore::new();

        store.add(sections("courses")).unwrap();
        let result = store.add(rooms("courses"));

        assert!(matches!(result, Err(DatasetStoreError::AlreadyExists(_))));
        assert_eq!(
            store.get("courses").unwrap().kind(),
            DatasetKind::Sections
        );
    }

    #[test]
    fn test_add_rejects_empty_dataset() {
        let store = InMemoryDatasetStore::new();

        let result = store.add(Dataset::from_sections("courses", Vec::new()));

        assert!(matches!(result, Err(DatasetStoreError::EmptyDataset(_))));
    }

    #[test]
    fn test_remove() {
        let store = InMemoryDatasetStore::new();
        store.add(sections("courses")).unwrap();

        assert_eq!(store.remove("courses").unwrap(), "courses");
        assert!(matches!(
            store.get("courses"),
            Err(DatasetStoreError::NotFound(_))
        ));
        assert!(matches!(
            store.remove("courses"),
            Err(DatasetStoreError::NotFound(_))
        ));
        assert!(matches!(
            store.remove("bad_id"),
            Err(DatasetStoreError::InvalidId(_))
        ));
    }

    #[test]
    fn test_held_snapshot_survives_removal() {
        let store = InMemoryDatasetStore::new();
        store.add(sections("courses")).unwrap();

        let held = store.get("courses").unwrap();
        store.remove("courses").unwrap();

        assert_eq!(held.len(), 2);
        assert_eq!(held.id(), "courses");
    }

    #[test]
    fn test_list() {
        let store = InMemoryDatasetStore::new();
        store.add(rooms("rooms")).unwrap();
        store.add(sections("courses")).unwrap();

        let infos = store.list().unwrap();

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, "courses");
        assert_eq!(infos[0].num_rows, 2);
        assert_eq!(infos[1].id, "rooms");
        assert_eq!(infos[1].kind, DatasetKind::Rooms);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = InMemoryDatasetStore::new_shared();
        store.add(sections("base")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = format!("set{i}");
                    store.add(sections(&id)).unwrap();
                    assert_eq!(store.get("base").unwrap().len(), 2);
                    store.remove(&id).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list().unwrap().len(), 1);
    }
}
