// ── Remote (device-facing) representation ──
//
// RESTCONF yang-data JSON is presence-sensitive: a boolean toggle is often
// encoded as the *existence* of a key, with the value being the empty-leaf
// marker `[null]`. `RemoteValue::Empty` models that state explicitly so
// presence is checkable rather than inferred from pointer tricks.

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A node in the remote object tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteValue {
    /// Present with intentionally no value -- the RESTCONF empty leaf,
    /// serialized as `[null]`.
    Empty,
    Str(String),
    Int(i64),
    Bool(bool),
    Object(RemoteObject),
    List(Vec<RemoteValue>),
}

impl RemoteValue {
    pub fn as_object(&self) -> Option<&RemoteObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RemoteValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Empty => serde_json::json!([null]),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Object(o) => o.to_json(),
            Self::List(l) => serde_json::Value::Array(l.iter().map(Self::to_json).collect()),
        }
    }

    fn from_json(value: serde_json::Value) -> Self {
        match value {
            // Plain null and `[null]` both mean "present, no value".
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Str(n.to_string()), Self::Int),
            serde_json::Value::Array(items) => {
                if items.len() == 1 && items[0].is_null() {
                    Self::Empty
                } else {
                    Self::List(items.into_iter().map(Self::from_json).collect())
                }
            }
            serde_json::Value::Object(map) => {
                let mut obj = RemoteObject::new();
                for (k, v) in map {
                    obj.insert(k, Self::from_json(v));
                }
                Self::Object(obj)
            }
        }
    }
}

impl Serialize for RemoteValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RemoteValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(value))
    }
}

/// A nested tree of named remote fields, insertion-ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteObject {
    entries: IndexMap<String, RemoteValue>,
}

impl RemoteObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: RemoteValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&RemoteValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<RemoteValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RemoteValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Walk a nested path, returning the value at its end if every
    /// intermediate node exists and is an object.
    pub fn get_path(&self, path: &[String]) -> Option<&RemoteValue> {
        let (first, rest) = path.split_first()?;
        let value = self.entries.get(first)?;
        if rest.is_empty() {
            return Some(value);
        }
        value.as_object()?.get_path(rest)
    }

    /// Set a value at a nested path, materializing intermediate objects.
    ///
    /// An empty path merges `value` (which must then be an object) into
    /// this object -- used by block elements whose fields live at the
    /// element root.
    pub fn set_path(&mut self, path: &[String], value: RemoteValue) {
        match path.split_first() {
            None => {
                if let RemoteValue::Object(o) = value {
                    for (k, v) in o.entries {
                        self.entries.insert(k, v);
                    }
                }
            }
            Some((first, rest)) => {
                if rest.is_empty() {
                    self.entries.insert(first.clone(), value);
                    return;
                }
                let entry = self
                    .entries
                    .entry(first.clone())
                    .or_insert_with(|| RemoteValue::Object(Self::new()));
                if !matches!(entry, RemoteValue::Object(_)) {
                    *entry = RemoteValue::Object(Self::new());
                }
                if let RemoteValue::Object(inner) = entry {
                    inner.set_path(rest, value);
                }
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Parse a JSON object into a `RemoteObject`. Non-object input yields
    /// an empty tree (a RESTCONF read of a container is always an object).
    pub fn from_json(value: serde_json::Value) -> Self {
        match RemoteValue::from_json(value) {
            RemoteValue::Object(o) => o,
            _ => Self::new(),
        }
    }
}

impl Serialize for RemoteObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RemoteObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(value))
    }
}

impl FromIterator<(String, RemoteValue)> for RemoteObject {
    fn from_iter<T: IntoIterator<Item = (String, RemoteValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
