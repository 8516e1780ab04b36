// ── Declared (desired-state) representation ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single declared field value.
///
/// A field that was never set by the caller is simply absent from the
/// record -- there is no `Value` variant for absence, and absence is
/// distinct from `Str("")`, `Int(0)` or `Bool(false)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Ordered list of sub-records (repeated blocks: secondary IPs,
    /// prefix-lists, timers).
    List(Vec<DeclaredRecord>),
}

impl Value {
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

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DeclaredRecord]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<DeclaredRecord>> for Value {
    fn from(l: Vec<DeclaredRecord>) -> Self {
        Self::List(l)
    }
}

/// Flat mapping from declared field name to value.
///
/// Field order is preserved (insertion order) so payloads and diffs are
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclaredRecord {
    fields: IndexMap<String, Value>,
}

impl DeclaredRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style `set` for test and table construction.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for DeclaredRecord {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_is_not_zero_value() {
        let r = DeclaredRecord::new().with("shutdown", false);
        assert!(r.contains("shutdown"));
        assert!(!r.contains("description"));
        assert_eq!(r.get("shutdown"), Some(&Value::Bool(false)));
        assert_eq!(r.get("description"), None);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut r = DeclaredRecord::new().with("a", 1).with("b", 2);
        r.set("a", 3);
        let order: Vec<&str> = r.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(r.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(7i64).as_int(), Some(7));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7i64).as_str(), None);
        assert_eq!(Value::from(vec![]).type_name(), "list");
    }
}
