//! Generic description of a persisted record.
//!
//! The repository layer is generic over [`Entity`]; it only needs to know the
//! entity's fields, how to read a field's value, and which field carries the
//! soft-delete flag.

use chrono::{DateTime, Utc};
use std::fmt;

/// A single column value used in filters and assignments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<V: Into<FieldValue>> From<Option<V>> for FieldValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// A record type managed by a [`crate::domain::repositories::Repository`].
///
/// Implemented by hand for each entity, in the style of:
///
/// ```ignore
/// impl Entity for ShortLink {
///     type Field = ShortLinkField;
///     type Draft = NewShortLink;
///     const TABLE: &'static str = "short_links";
///     const SOFT_DELETE: ShortLinkField = ShortLinkField::IsDeleted;
///     const UNIQUE: &'static [ShortLinkField] = &[ShortLinkField::ShortId];
///     ...
/// }
/// ```
pub trait Entity: Clone + fmt::Debug + Send + Sync + Unpin + 'static {
    /// Column identifier. Ordered so filters have a deterministic SQL layout.
    type Field: Copy + Eq + Ord + fmt::Debug + Send + Sync + 'static;
    /// Payload accepted by `create`.
    type Draft: Draft<Self>;

    const TABLE: &'static str;
    /// Boolean column marking the record as deleted.
    const SOFT_DELETE: Self::Field;
    /// Fields with a unique constraint.
    const UNIQUE: &'static [Self::Field];
    const FIELDS: &'static [Self::Field];

    fn column(field: Self::Field) -> &'static str;

    /// Reads the current value of `field`.
    fn value(&self, field: Self::Field) -> FieldValue;

    /// Resets `field` to its default value. Used to apply projections.
    fn clear(&mut self, field: Self::Field);

    /// Assigns `value` to `field`, ignoring values of the wrong type.
    fn apply(&mut self, field: Self::Field, value: &FieldValue);

    /// Name of the unique constraint on `field`, as PostgreSQL names an
    /// inline `UNIQUE` column: `<table>_<column>_key`.
    fn unique_constraint(field: Self::Field) -> String {
        format!("{}_{}_key", Self::TABLE, Self::column(field))
    }

    fn field_by_name(name: &str) -> Option<Self::Field> {
        Self::FIELDS
            .iter()
            .copied()
            .find(|field| Self::column(*field) == name)
    }
}

/// Creation payload of an [`Entity`].
pub trait Draft<T: Entity>: fmt::Debug + Send + Sync + 'static {
    /// Column values to insert. Store-generated columns are omitted.
    fn values(&self) -> Vec<(T::Field, FieldValue)>;

    /// Materializes the record for stores that assign identity themselves.
    fn into_entity(self, seq: i64, now: DateTime<Utc>) -> T;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<String>), FieldValue::Null);
        assert_eq!(
            FieldValue::from(Some("user1")),
            FieldValue::Text("user1".to_string())
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Int(1).as_bool(), None);
        assert_eq!(FieldValue::from("abc").as_str(), Some("abc"));
        assert!(FieldValue::Null.is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Int(42).to_string(), "42");
        assert_eq!(FieldValue::Null.to_string(), "null");
    }
}
