use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};

/// A field-keyed record of store values.
///
/// A key that is missing is "unset"; there is no sentinel value for absence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::insert`], used when declaring shapes.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` when both records define exactly the same keys.
    pub fn same_keys(&self, other: &Record) -> bool {
        self.fields.len() == other.fields.len() && self.keys().eq(other.keys())
    }

    pub(crate) fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.fields.insert(key, value)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Render as a JSON object, mostly for logging and debugging.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
