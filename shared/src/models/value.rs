//! Attribute values exposed by records.
//!
//! Records hand out borrowed [`AttrRef`]s during filtering; rows that outlive the
//! record (grouped rows, projected results) carry owned [`AttrValue`]s.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A borrowed attribute value read from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrRef<'a> {
    /// Text attribute (e.g. `dept`, `shortname`).
    Text(&'a str),
    /// Numeric attribute (e.g. `avg`, `seats`).
    Number(f64),
}

impl<'a> AttrRef<'a> {
    /// Converts the borrowed value into an owned one.
    #[must_use]
    pub fn to_owned_value(self) -> AttrValue {
        match self {
            Self::Text(s) => AttrValue::Text(s.to_string()),
            Self::Number(n) => AttrValue::Number(n),
        }
    }

    /// Returns the numeric value, if this is a number.
    #[must_use]
    pub const fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(_) => None,
        }
    }

    /// Returns the text value, if this is text.
    #[must_use]
    pub const fn as_text(self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Returns the name of the value's type, for error messages.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Number(_) => "number",
        }
    }

    /// Renders the value as plain decimal text (numbers without locale formatting).
    #[must_use]
    pub fn to_key_text(self) -> String {
        match self {
            Self::Text(s) => s.to_string(),
            Self::Number(n) => format_number(n),
        }
    }
}

/// An owned attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
}

impl AttrValue {
    /// Borrows the value.
    #[must_use]
    pub fn as_attr(&self) -> AttrRef<'_> {
        match self {
            Self::Text(s) => AttrRef::Text(s.as_str()),
            Self::Number(n) => AttrRef::Number(*n),
        }
    }

    /// Returns the numeric value, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the text value, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Number(_) => None,
        }
    }

    /// Total ordering used when sorting result rows.
    ///
    /// Numbers order numerically, text orders lexicographically by code point,
    /// and any number sorts before any text.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => {
                if let Some(i) = as_exact_integer(*n) {
                    serializer.serialize_i64(i)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
        }
    }
}

/// Returns the integer value of `n` when it is integral and exactly representable.
#[allow(clippy::cast_possible_truncation)]
fn as_exact_integer(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER).then(|| n as i64)
}

/// Formats a number as plain decimal text: `98.0` renders as `98`, `97.5` as `97.5`.
fn format_number(n: f64) -> String {
    match as_exact_integer(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}
