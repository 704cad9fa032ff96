//! Data models for the Insight query service.
//!
//! This module contains the record kinds (course sections and rooms), the
//! attribute-access capability they share, and the dataset container.

pub mod dataset;
pub mod record;
pub mod room;
pub mod section;
pub mod value;

pub use dataset::{Dataset, DatasetInfo, DatasetKind, InvalidRecord};
pub use record::{Record, RecordError};
pub use room::Room;
pub use section::{RawCourseSection, RawScalar, Section, OVERALL_SECTION_YEAR};
pub use value::{AttrRef, AttrValue};
