//! Dynamic field values used by queryset filtering and ordering.
//!
//! Entities expose their fields by name as [`FieldValue`]s so the generic
//! queryset can compare and sort records without knowing their concrete
//! type. Equality is exact and same-variant only -- `Int(1)` does not equal
//! `Float(1.0)`, matching the store's own comparison semantics.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::{DocId, Pk, Timestamp};

/// A single field value extracted from an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Time(Timestamp),
    Id(DocId),
}

impl FieldValue {
    /// Total ordering across values of the same variant; mixed variants
    /// order by a fixed type rank so sorting never panics on dirty data.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Str(a), Str(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            (Id(a), Id(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) => 2,
            FieldValue::Str(_) => 3,
            FieldValue::Time(_) => 4,
            FieldValue::Id(_) => 5,
        }
    }

    /// JSON rendition of the value, as it appears inside a stored document.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Str(s) => Value::from(s.clone()),
            FieldValue::Time(t) => Value::from(t.to_rfc3339()),
            FieldValue::Id(id) => Value::from(id.to_string()),
        }
    }
}

impl From<Pk> for FieldValue {
    fn from(v: Pk) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(v: Timestamp) -> Self {
        FieldValue::Time(v)
    }
}

impl From<DocId> for FieldValue {
    fn from(v: DocId) -> Self {
        FieldValue::Id(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_variant_equality_is_exact() {
        assert_eq!(FieldValue::Int(7), FieldValue::Int(7));
        assert_ne!(FieldValue::Int(7), FieldValue::Int(8));
        assert_eq!(
            FieldValue::Str("Widget".into()),
            FieldValue::Str("Widget".into())
        );
        assert_ne!(
            FieldValue::Str("Widget".into()),
            FieldValue::Str("widget".into())
        );
    }

    #[test]
    fn no_cross_variant_equality() {
        assert_ne!(FieldValue::Int(1), FieldValue::Float(1.0));
        assert_ne!(FieldValue::Str("1".into()), FieldValue::Int(1));
        assert_ne!(FieldValue::Null, FieldValue::Bool(false));
    }

    #[test]
    fn numeric_comparison_spans_int_and_float() {
        assert_eq!(
            FieldValue::Int(2).compare(&FieldValue::Float(1.5)),
            Ordering::Greater
        );
        assert_eq!(
            FieldValue::Float(0.5).compare(&FieldValue::Int(1)),
            Ordering::Less
        );
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        assert_eq!(
            FieldValue::Str("alpha".into()).compare(&FieldValue::Str("bravo".into())),
            Ordering::Less
        );
    }

    #[test]
    fn null_sorts_before_everything() {
        assert_eq!(
            FieldValue::Null.compare(&FieldValue::Int(i64::MIN)),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Null.compare(&FieldValue::Str(String::new())),
            Ordering::Less
        );
    }
}
