//! Course section records.

use super::record::{Record, RecordError};
use super::value::AttrRef;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Year assigned to the aggregate "overall" section of a course.
pub const OVERALL_SECTION_YEAR: i32 = 1900;

/// A single offering of a course.
///
/// # Example
///
/// ```
/// use shared::models::{AttrRef, Record, Section};
///
/// let section = Section::new("42", "310", "software eng", "holmes", "cpsc", 2015, 78.5);
/// assert_eq!(section.get("dept"), Some(AttrRef::Text("cpsc")));
/// assert_eq!(section.get("avg"), Some(AttrRef::Number(78.5)));
/// assert_eq!(section.get("seats"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Section {
    /// Unique section identifier.
    #[validate(length(min = 1, message = "Section uuid cannot be empty"))]
    pub uuid: String,
    /// Course number within the department (e.g. "310").
    pub id: String,
    /// Course title.
    pub title: String,
    /// Instructor name(s).
    pub instructor: String,
    /// Department code (e.g. "cpsc").
    #[validate(length(min = 1, message = "Department cannot be empty"))]
    pub dept: String,
    /// Year the section ran.
    pub year: i32,
    /// Section grade average.
    pub avg: f64,
    /// Number of students who passed.
    pub pass: u32,
    /// Number of students who failed.
    pub fail: u32,
    /// Number of students who audited.
    pub audit: u32,
}

impl Section {
    /// Attributes every section exposes through [`Record::get`].
    pub const ATTRIBUTES: &'static [&'static str] = &[
        "uuid",
        "id",
        "title",
        "instructor",
        "dept",
        "year",
        "avg",
        "pass",
        "fail",
        "audit",
    ];

    /// Creates a section with zero pass/fail/audit counts.
    #[must_use]
    pub fn new(
        uuid: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        instructor: impl Into<String>,
        dept: impl Into<String>,
        year: i32,
        avg: f64,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            id: id.into(),
            title: title.into(),
            instructor: instructor.into(),
            dept: dept.into(),
            year,
            avg,
            pass: 0,
            fail: 0,
            audit: 0,
        }
    }

    /// Sets the pass/fail/audit counts.
    #[must_use]
    pub const fn with_counts(mut self, pass: u32, fail: u32, audit: u32) -> Self {
        self.pass = pass;
        self.fail = fail;
        self.audit = audit;
        self
    }
}

impl Record for Section {
    fn get(&self, attribute: &str) -> Option<AttrRef<'_>> {
        let value = match attribute {
            "uuid" => AttrRef::Text(&self.uuid),
            "id" => AttrRef::Text(&self.id),
            "title" => AttrRef::Text(&self.title),
            "instructor" => AttrRef::Text(&self.instructor),
            "dept" => AttrRef::Text(&self.dept),
            "year" => AttrRef::Number(f64::from(self.year)),
            "avg" => AttrRef::Number(self.avg),
            "pass" => AttrRef::Number(f64::from(self.pass)),
            "fail" => AttrRef::Number(f64::from(self.fail)),
            "audit" => AttrRef::Number(f64::from(self.audit)),
            _ => return None,
        };
        Some(value)
    }
}

/// A scalar that course files encode either as a number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    /// JSON number.
    Number(f64),
    /// JSON string.
    Text(String),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => AttrRef::Number(n).to_key_text(),
            Self::Text(s) => s,
        }
    }
}

/// One row of a raw course file, as found in its `result` array.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCourseSection {
    /// Section identifier (numeric in most files).
    #[serde(rename = "id")]
    pub uuid: RawScalar,
    /// Course number.
    #[serde(rename = "Course")]
    pub course: String,
    /// Course title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Instructor name(s).
    #[serde(rename = "Professor")]
    pub professor: String,
    /// Department code.
    #[serde(rename = "Subject")]
    pub subject: String,
    /// Year, as a number or numeric string.
    #[serde(rename = "Year")]
    pub year: RawScalar,
    /// Grade average.
    #[serde(rename = "Avg")]
    pub avg: f64,
    /// Passing students.
    #[serde(rename = "Pass")]
    pub pass: u32,
    /// Failing students.
    #[serde(rename = "Fail")]
    pub fail: u32,
    /// Auditing students.
    #[serde(rename = "Audit")]
    pub audit: u32,
    /// Section label; `"overall"` marks the course-wide aggregate row.
    #[serde(rename = "Section", default)]
    pub section: Option<String>,
}

impl TryFrom<RawCourseSection> for Section {
    type Error = RecordError;

    fn try_from(raw: RawCourseSection) -> Result<Self, Self::Error> {
        let year = if raw.section.as_deref() == Some("overall") {
            OVERALL_SECTION_YEAR
        } else {
            parse_year(raw.year)?
        };

        let section = Self {
            uuid: raw.uuid.into_text(),
            id: raw.course,
            title: raw.title,
            instructor: raw.professor,
            dept: raw.subject,
            year,
            avg: raw.avg,
            pass: raw.pass,
            fail: raw.fail,
            audit: raw.audit,
        };
        section.validate()?;
        Ok(section)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_year(raw: RawScalar) -> Result<i32, RecordError> {
    match raw {
        RawScalar::Number(n) if n.fract() == 0.0 && n.abs() < f64::from(i32::MAX) => {
            Ok(n as i32)
        }
        RawScalar::Number(n) => Err(RecordError::InvalidYear(n.to_string())),
        RawScalar::Text(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| RecordError::InvalidYear(s)),
    }
}
