//! Datasets: a named, immutable collection of records of one kind.

use super::record::{Record, RecordError};
use super::room::Room;
use super::section::{RawCourseSection, Section};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// The kind of records a dataset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Course sections.
    Sections,
    /// Campus rooms.
    Rooms,
}

impl DatasetKind {
    /// Returns the attribute names records of this kind expose.
    #[must_use]
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::Sections => Section::ATTRIBUTES,
            Self::Rooms => Room::ATTRIBUTES,
        }
    }

    /// Returns true if `attribute` is a known attribute of this kind.
    #[must_use]
    pub fn has_attribute(self, attribute: &str) -> bool {
        self.attributes().contains(&attribute)
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sections => write!(f, "sections"),
            Self::Rooms => write!(f, "rooms"),
        }
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sections" => Ok(Self::Sections),
            "rooms" => Ok(Self::Rooms),
            other => Err(format!(
                "Unknown dataset kind: '{other}'. Expected 'sections' or 'rooms'"
            )),
        }
    }
}

/// A loaded dataset.
///
/// Records are only reachable as [`Record`] trait objects; the constructors
/// guarantee every record matches the dataset's kind.
#[derive(Debug)]
pub struct Dataset {
    id: String,
    kind: DatasetKind,
    records: Vec<Box<dyn Record>>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Creates a sections dataset.
    #[must_use]
    pub fn from_sections(id: impl Into<String>, sections: Vec<Section>) -> Self {
        Self::build(id.into(), DatasetKind::Sections, sections)
    }

    /// Creates a rooms dataset.
    #[must_use]
    pub fn from_rooms(id: impl Into<String>, rooms: Vec<Room>) -> Self {
        Self::build(id.into(), DatasetKind::Rooms, rooms)
    }

    /// Builds a dataset of `kind` from JSON rows.
    ///
    /// Sections rows use the raw course-file shape ([`RawCourseSection`]);
    /// rooms rows use the [`Room`] shape. Every row is validated.
    ///
    /// # Errors
    ///
    /// Returns the index and cause of the first row that cannot be converted.
    pub fn from_json_rows(
        id: impl Into<String>,
        kind: DatasetKind,
        rows: Vec<Value>,
    ) -> Result<Self, InvalidRecord> {
        let id = id.into();
        match kind {
            DatasetKind::Sections => {
                let sections = convert_rows(rows, |row| {
                    let raw: RawCourseSection = serde_json::from_value(row)?;
                    Section::try_from(raw)
                })?;
                Ok(Self::from_sections(id, sections))
            }
            DatasetKind::Rooms => {
                let rooms = convert_rows(rows, |row| {
                    let room: Room = serde_json::from_value(row)?;
                    room.validate_room()?;
                    Ok(room)
                })?;
                Ok(Self::from_rooms(id, rooms))
            }
        }
    }

    fn build<R: Record + 'static>(id: String, kind: DatasetKind, records: Vec<R>) -> Self {
        Self {
            id,
            kind,
            records: records
                .into_iter()
                .map(|r| Box::new(r) as Box<dyn Record>)
                .collect(),
            loaded_at: Utc::now(),
        }
    }

    /// The dataset id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The dataset kind.
    #[must_use]
    pub const fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Iterates over the records.
    pub fn records(&self) -> impl Iterator<Item = &dyn Record> + '_ {
        self.records.iter().map(|record| &**record)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the dataset was loaded.
    #[must_use]
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Summary used when listing datasets.
    #[must_use]
    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            id: self.id.clone(),
            kind: self.kind,
            num_rows: self.records.len(),
            loaded_at: self.loaded_at,
        }
    }
}

/// A row rejected while building a dataset.
#[derive(Debug, Error)]
#[error("Record {index} is invalid: {source}")]
pub struct InvalidRecord {
    /// Position of the row in the input.
    pub index: usize,
    /// Why it was rejected.
    #[source]
    pub source: RecordError,
}

fn convert_rows<R>(
    rows: Vec<Value>,
    convert: impl Fn(Value) -> Result<R, RecordError>,
) -> Result<Vec<R>, InvalidRecord> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| convert(row).map_err(|source| InvalidRecord { index, source }))
        .collect()
}

/// Summary of a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    /// Dataset id.
    pub id: String,
    /// Record kind.
    pub kind: DatasetKind,
    /// Number of records.
    pub num_rows: usize,
    /// Load timestamp.
    pub loaded_at: DateTime<Utc>,
}
