//! Caller-supplied arguments for one invocation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Reserved key carrying credentials for the authentication selector.
pub const SECURITY_KEY: &str = "security";

/// An unordered map of argument name to JSON value.
///
/// The bag is only ever read by the engine; every invocation takes it by
/// reference. The reserved [`SECURITY_KEY`] entry holds credentials and is
/// never sent as an argument.
///
/// ## Examples
///
/// ```
/// use courier::ArgumentBag;
/// use serde_json::json;
///
/// let bag = ArgumentBag::new()
///     .with("id", "42")
///     .with("security", json!({ "token": "abc" }));
///
/// assert_eq!(bag.get("id"), Some(&json!("42")));
/// assert_eq!(bag.credential("token"), Some(&json!("abc")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentBag(Map<String, Value>);

impl ArgumentBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, returning the bag.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Inserts an argument, returning any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Looks up an argument.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Looks up an argument, treating JSON `null` as absent.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// Returns `true` if the bag has an entry under `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The credential metadata under [`SECURITY_KEY`], if it is an object.
    pub fn security(&self) -> Option<&Map<String, Value>> {
        self.0.get(SECURITY_KEY).and_then(Value::as_object)
    }

    /// A single credential field, treating JSON `null` as absent.
    pub fn credential(&self, field: &str) -> Option<&Value> {
        self.security()
            .and_then(|security| security.get(field))
            .filter(|value| !value.is_null())
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Argument names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the bag, returning the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ArgumentBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ArgumentBag {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(ValidationError::ArgumentsNotObject),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ArgumentBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Renders an argument value as the text sent on the wire.
///
/// Strings are used verbatim, `null` renders empty and every other value
/// renders as its JSON text.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Returns `true` for values that cannot fill a required slot (`null`, `""`).
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}
