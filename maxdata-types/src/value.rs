//! The closed set of values a record field can hold.
//!
//! Every read and write site matches exhaustively on [`DataValue`]; there is
//! no untyped "object" escape hatch.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A nested generic document stored inside a single field.
pub type NestedDocument = BTreeMap<String, DataValue>;

/// A typed field value.
///
/// Numeric, timestamp and identifier variants each have an "unset"
/// sentinel (see [`DataValue::is_unset`]) that readers treat as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DataValue {
    Text(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Identifier(Uuid),
    Bytes(Vec<u8>),
    TextList(Vec<String>),
    Document(NestedDocument),
    /// Reference to an externally stored stream (path or handle).
    Stream(String),
}

impl DataValue {
    /// Returns true when the value is its type's "never assigned" sentinel.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Integer(v) => *v == i32::MIN,
            Self::Long(v) => *v == i64::MIN,
            Self::Double(v) => *v == f64::MIN || v.is_nan(),
            Self::Timestamp(v) => *v == DateTime::<Utc>::MIN_UTC,
            Self::Identifier(v) => v.is_nil(),
            Self::Text(_)
            | Self::Boolean(_)
            | Self::Bytes(_)
            | Self::TextList(_)
            | Self::Document(_)
            | Self::Stream(_) => false,
        }
    }

    /// Returns true for the integer, long and double variants.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Long(_) | Self::Double(_))
    }

    /// Numeric view of the value. Unset sentinels yield `None`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        if self.is_unset() {
            return None;
        }
        match self {
            Self::Integer(v) => Some(f64::from(*v)),
            Self::Long(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrowed text for the text-like variants.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Stream(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp view of the value.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Compares the value against a literal taken from a filter expression.
    ///
    /// Numeric values compare numerically, booleans accept `true`/`false`/`1`/`0`
    /// in any case, identifiers and timestamps are parsed before comparing,
    /// everything else compares by its canonical string.
    #[must_use]
    pub fn matches_literal(&self, literal: &str) -> bool {
        let literal = literal.trim();
        match self {
            Self::Integer(_) | Self::Long(_) | Self::Double(_) => {
                match (self.as_f64(), literal.parse::<f64>()) {
                    (Some(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            Self::Boolean(v) => parse_bool(literal) == Some(*v),
            Self::Identifier(v) => Uuid::parse_str(literal).is_ok_and(|u| u == *v),
            Self::Timestamp(v) => DateTime::parse_from_rfc3339(literal)
                .is_ok_and(|t| t.with_timezone(&Utc) == *v),
            Self::Text(_)
            | Self::Bytes(_)
            | Self::TextList(_)
            | Self::Document(_)
            | Self::Stream(_) => self.to_string() == literal,
        }
    }

    /// Orders two values of compatible kinds.
    ///
    /// Numbers compare across integer/long/double; text, timestamps,
    /// identifiers and booleans compare within their own kind.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Identifier(a), Self::Identifier(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Formats a timestamp as ISO-8601 UTC with millisecond precision.
#[must_use]
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_bool(literal: &str) -> Option<bool> {
    match literal.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for DataValue {
    /// Canonical string form, used for keys, filters and group keys.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Stream(s) => f.write_str(s),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Timestamp(v) => f.write_str(&format_timestamp(v)),
            Self::Identifier(v) => write!(f, "{v}"),
            Self::Bytes(v) => f.write_str(&STANDARD.encode(v)),
            Self::TextList(v) => f.write_str(&v.join(",")),
            Self::Document(doc) => {
                let text = serde_json::to_string(doc).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
        }
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Uuid> for DataValue {
    fn from(v: Uuid) -> Self {
        Self::Identifier(v)
    }
}

impl From<crate::RecordId> for DataValue {
    fn from(v: crate::RecordId) -> Self {
        Self::Identifier(v.as_uuid())
    }
}

impl From<Vec<u8>> for DataValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<String>> for DataValue {
    fn from(v: Vec<String>) -> Self {
        Self::TextList(v)
    }
}

impl From<NestedDocument> for DataValue {
    fn from(v: NestedDocument) -> Self {
        Self::Document(v)
    }
}
