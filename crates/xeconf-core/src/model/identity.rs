// ── Resource identity ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::declared::Value;

/// A single identity key value. Identity fields are always scalar, and
/// RESTCONF list keys are only ever strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Str(String),
    Int(i64),
}

impl KeyValue {
    /// Build from a declared value; `Bool` and `List` are not valid keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(Self::Str(s.clone())),
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Bool(_) | Value::List(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Str(s) => Value::Str(s.clone()),
            Self::Int(i) => Value::Int(*i),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

/// The immutable key set naming one resource instance across its lifecycle.
///
/// Derived from declared fields at create time; changing any key forces
/// destroy-then-recreate, never an in-place update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    kind: String,
    keys: Vec<(String, KeyValue)>,
}

impl Identity {
    pub fn new(kind: impl Into<String>, keys: Vec<(String, KeyValue)>) -> Self {
        Self {
            kind: kind.into(),
            keys,
        }
    }

    /// The resource kind this identity belongs to.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, field: &str) -> Option<&KeyValue> {
        self.keys
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, &KeyValue)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.kind)?;
        for (i, (name, value)) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("]")
    }
}
