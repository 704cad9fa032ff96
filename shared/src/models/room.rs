//! Room records.

use super::record::{Record, RecordError};
use super::value::AttrRef;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A bookable room in a campus building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Room {
    /// Full building name.
    pub fullname: String,
    /// Building code (e.g. "DMP").
    #[validate(length(min = 1, message = "Building short name cannot be empty"))]
    pub shortname: String,
    /// Room number; text because some numbers carry letters.
    #[validate(length(min = 1, message = "Room number cannot be empty"))]
    pub number: String,
    /// Room name, conventionally `<shortname>_<number>`.
    pub name: String,
    /// Street address of the building.
    pub address: String,
    /// Building latitude.
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    /// Building longitude.
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    /// Seating capacity.
    pub seats: u32,
    /// Room type (e.g. "Tiered Large Group").
    #[serde(rename = "type")]
    pub room_type: String,
    /// Furniture description.
    pub furniture: String,
    /// Link to the room's page.
    pub href: String,
}

impl Room {
    /// Attributes every room exposes through [`Record::get`].
    pub const ATTRIBUTES: &'static [&'static str] = &[
        "fullname",
        "shortname",
        "number",
        "name",
        "address",
        "lat",
        "lon",
        "seats",
        "type",
        "furniture",
        "href",
    ];

    /// Runs field validation on an ingested room.
    ///
    /// # Errors
    ///
    /// Returns an error if the building code or room number is empty, or the
    /// coordinates are out of range.
    pub fn validate_room(&self) -> Result<(), RecordError> {
        self.validate()?;
        Ok(())
    }
}

impl Record for Room {
    fn get(&self, attribute: &str) -> Option<AttrRef<'_>> {
        let value = match attribute {
            "fullname" => AttrRef::Text(&self.fullname),
            "shortname" => AttrRef::Text(&self.shortname),
            "number" => AttrRef::Text(&self.number),
            "name" => AttrRef::Text(&self.name),
            "address" => AttrRef::Text(&self.address),
            "lat" => AttrRef::Number(self.lat),
            "lon" => AttrRef::Number(self.lon),
            "seats" => AttrRef::Number(f64::from(self.seats)),
            "type" => AttrRef::Text(&self.room_type),
            "furniture" => AttrRef::Text(&self.furniture),
            "href" => AttrRef::Text(&self.href),
            _ => return None,
        };
        Some(value)
    }
}
