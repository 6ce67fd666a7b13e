//! src/model/field.rs
//! ============================================================================
//! # Field access for table rows
//!
//! The query engine and the table renderer address item attributes by name
//! (`"department"`, `"applied_at"`). Items implement [`Record`] to expose
//! those attributes as a tagged [`FieldValue`].

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use std::cmp::Ordering;
use std::fmt;

/// A single attribute value of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(CompactString),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl FieldValue {
    /// Rank used to order values of different kinds against each other.
    const fn kind_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Date(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order over values: natural order within a kind, ints and floats
    /// compared numerically, NaN after every other float.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    /// Lower-cased display form, used by free-text search.
    #[must_use]
    pub fn search_text(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(CompactString::new(value))
    }
}

impl From<CompactString> for FieldValue {
    fn from(value: CompactString) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Named-attribute access for anything shown in a data table.
pub trait Record {
    /// Value of the attribute called `key`, or `None` when the record has no
    /// such attribute or it is unset.
    fn field(&self, key: &str) -> Option<FieldValue>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_numeric_kinds_compare_by_value() {
        let one = FieldValue::Int(1);
        let one_half = FieldValue::Float(1.5);
        assert_eq!(one.total_cmp(&one_half), Ordering::Less);
        assert_eq!(one_half.total_cmp(&FieldValue::Int(2)), Ordering::Less);
    }

    #[test]
    fn test_mixed_kinds_are_totally_ordered() {
        let text = FieldValue::from("a");
        let num = FieldValue::Int(99);
        assert_eq!(num.total_cmp(&text), Ordering::Less);
        assert_eq!(text.total_cmp(&num), Ordering::Greater);
    }

    #[test]
    fn test_display_forms() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).unwrap();
        assert_eq!(FieldValue::from(date).to_string(), "2024-03-09");
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::from("Engineering Ops").search_text(), "engineering ops");
    }
}
