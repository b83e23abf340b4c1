/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! View and value types.
//!
//! A [`View`] is the data a template is rendered against: an insertion-ordered
//! map from field names to [`Value`]s. Views compose by override-merge, which
//! is how section repetitions see both the element fields and the outer page.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// A zero-argument producer of a string, evaluated when a template references it.
///
/// Producers are invoked once per referencing tag. A field referenced twice
/// is computed twice; callers that need memoisation wrap it themselves.
#[derive(Clone)]
pub struct Producer(Arc<dyn Fn() -> String + Send + Sync>);

impl Producer {
    pub fn new(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Producer(Arc::new(f))
    }

    /// Run the producer.
    pub fn call(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Producer(..)")
    }
}

impl PartialEq for Producer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A value bound to a view field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),

    /// A boolean value. `true` opens a section once, `false` hides it.
    Bool(bool),

    /// A sequence of views, one section repetition per element.
    List(Vec<View>),

    /// A lazily computed string.
    Lazy(Producer),
}

impl Value {
    /// Build a lazy value from a closure.
    pub fn lazy(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Value::Lazy(Producer::new(f))
    }

    /// The text this value interpolates to, if it has a scalar rendering.
    ///
    /// - String: returned as-is
    /// - Bool: "true" or "false"
    /// - Lazy: the producer's output
    /// - List: `None`, lists only drive sections
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Lazy(producer) => Some(producer.call()),
            Value::List(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<View>> for Value {
    fn from(value: Vec<View>) -> Self {
        Value::List(value)
    }
}

impl From<Producer> for Value {
    fn from(value: Producer) -> Self {
        Value::Lazy(value)
    }
}

/// The data context a template is rendered against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    fields: IndexMap<String, Value>,
}

impl View {
    /// Create a new empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Builder form of [`View::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String value of a field, if the field holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Override-merge: a new view with `other`'s fields taking precedence.
    ///
    /// Neither input is modified. Keys already present in `self` keep their
    /// position; keys new in `other` are appended in `other`'s order.
    pub fn merge(&self, other: &View) -> View {
        let mut merged = self.clone();
        for (key, value) in &other.fields {
            merged.fields.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for View {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        View {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for View {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for View {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
