use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::entities::{EntityKind, SortDirection};
use crate::domain::errors::{RecordError, RecordResult};

/// A single typed column value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Flag(bool),
}

impl FieldValue {
    /// Ordering used for listings; values of different variants compare equal
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Flag(b) => f.write_str(if *b { "1" } else { "0" }),
        }
    }
}

/// Validated input ready to be inserted, in descriptor column order.
/// Store-assigned columns (creation timestamps) are not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub kind: EntityKind,
    pub values: Vec<(&'static str, FieldValue)>,
}

impl NewRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// A row as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Column lookup that also answers for `id`
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        if name == "id" {
            Some(FieldValue::Integer(self.id))
        } else {
            self.values.get(name).cloned()
        }
    }

    pub fn text(&self, name: &str) -> RecordResult<String> {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) => Ok(s.clone()),
            other => Err(Self::mismatch(name, "text", other)),
        }
    }

    pub fn optional_text(&self, name: &str) -> RecordResult<Option<String>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(FieldValue::Text(s)) => Ok(Some(s.clone())),
            other => Err(Self::mismatch(name, "text", other)),
        }
    }

    pub fn integer(&self, name: &str) -> RecordResult<i64> {
        match self.values.get(name) {
            Some(FieldValue::Integer(i)) => Ok(*i),
            other => Err(Self::mismatch(name, "integer", other)),
        }
    }

    pub fn decimal(&self, name: &str) -> RecordResult<f64> {
        match self.values.get(name) {
            Some(FieldValue::Decimal(d)) => Ok(*d),
            other => Err(Self::mismatch(name, "decimal", other)),
        }
    }

    pub fn flag(&self, name: &str) -> RecordResult<bool> {
        match self.values.get(name) {
            Some(FieldValue::Flag(b)) => Ok(*b),
            other => Err(Self::mismatch(name, "flag", other)),
        }
    }

    fn mismatch(name: &str, expected: &str, found: Option<&FieldValue>) -> RecordError {
        match found {
            None => RecordError::Store(format!("column '{}' missing from row", name)),
            Some(value) => RecordError::Store(format!(
                "column '{}' holds {:?}, expected {}",
                name, value, expected
            )),
        }
    }
}

/// Sort rows in place following a descriptor's `order_by`
pub fn sort_records(records: &mut [Record], order_by: &[(&str, SortDirection)]) {
    records.sort_by(|a, b| {
        for (field, direction) in order_by {
            let ordering = match (a.value(field), b.value(field)) {
                (Some(x), Some(y)) => x.compare(&y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}
