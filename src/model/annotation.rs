//! Node and branch annotations for phylogenetic trees.
//!
//! Provides the [Annotation] struct, a small key-value store attached to a
//! node of a [RootedTree](crate::model::RootedTree) or to a connection of the
//! unrooted graph. Supported values captured by [AnnotationValue] are `f64`,
//! `i64`, and `String`.

use std::collections::BTreeMap;
use std::fmt;

// =#========================================================================#=
// ANNOTATION
// =#========================================================================#=
/// Annotation of a single node or branch, mapping keys to values.
///
/// Keys are kept sorted, so iteration (and thus writing) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    values: BTreeMap<String, AnnotationValue>,
}

impl Annotation {
    /// Creates a new empty [Annotation].
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` under `key` and returns the annotation (builder style).
    pub fn with<K: Into<String>, V: Into<AnnotationValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, returning the value previously stored under `key`.
    pub fn insert<K: Into<String>, V: Into<AnnotationValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Option<AnnotationValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&AnnotationValue> {
        self.values.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<AnnotationValue> {
        self.values.remove(key)
    }

    /// Returns whether no key is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over all key-value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<AnnotationValue>> FromIterator<(K, V)> for Annotation {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut annotation = Annotation::new();
        for (key, value) in iter {
            annotation.insert(key, value);
        }
        annotation
    }
}

// =#========================================================================#=
// ANNOTATION VALUE
// =#========================================================================#=
/// Enum to encapsulate an annotation value.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// For floating point values
    Float(f64),
    /// For integer values
    Int(i64),
    /// For strings
    String(String),
}

impl AnnotationValue {
    /// Interprets a raw value string: integer first, then float, else string.
    pub fn parse(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            AnnotationValue::Int(v)
        } else if let Ok(v) = raw.parse::<f64>() {
            AnnotationValue::Float(v)
        } else {
            AnnotationValue::String(raw.to_string())
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnnotationValue::Float(v) => Some(*v),
            AnnotationValue::Int(v) => Some(*v as f64),
            AnnotationValue::String(_) => None,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Float(v) => write!(f, "{v:?}"),
            AnnotationValue::Int(v) => write!(f, "{v}"),
            AnnotationValue::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for AnnotationValue {
    fn from(v: f64) -> Self {
        AnnotationValue::Float(v)
    }
}

impl From<f32> for AnnotationValue {
    fn from(v: f32) -> Self {
        AnnotationValue::Float(v as f64)
    }
}

impl From<i64> for AnnotationValue {
    fn from(v: i64) -> Self {
        AnnotationValue::Int(v)
    }
}

impl From<i32> for AnnotationValue {
    fn from(v: i32) -> Self {
        AnnotationValue::Int(v as i64)
    }
}

impl From<String> for AnnotationValue {
    fn from(v: String) -> Self {
        AnnotationValue::String(v)
    }
}

impl From<&str> for AnnotationValue {
    fn from(v: &str) -> Self {
        AnnotationValue::String(v.to_string())
    }
}
