//! Records: the name-to-value mapping extracted from, or rendered into,
//! one logical fixed-width entry.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// A single extracted field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Trimmed text content.
    Text(String),
    /// Parsed integer content.
    Int(i64),
    /// An integer field that was present in the line but entirely blank.
    ///
    /// Distinct from an absent name: a blank integer column round-trips as
    /// "present but not filled in", while blank text fields are simply
    /// omitted from the record.
    Blank,
}

impl Value {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// True for a present-but-blank integer field.
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }

    /// The string this value renders as before any padding is applied.
    /// Blank values render as the empty string.
    pub fn rendered(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Blank => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Blank => Ok(()),
        }
    }
}

/// Field values keyed by field name.
///
/// Produced fresh by every processing operation and never mutated once
/// returned. Insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, replacing any existing one.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Set a field value only if the name is not already present.
    ///
    /// Multi-line processing merges per-line records with this so that a
    /// duplicated name keeps its earliest extraction.
    pub fn insert_new(&mut self, name: impl Into<String>, value: Value) {
        self.values.entry(name.into()).or_insert(value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Text content of a named field, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_text)
    }

    /// Integer content of a named field, if present and numeric.
    /// A present-but-blank integer yields `None` here; use [`Record::get`]
    /// to distinguish it from an absent name.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_int)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Record {
            values: iter.into_iter().collect(),
        }
    }
}
