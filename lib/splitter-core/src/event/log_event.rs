use std::mem;

use serde::{Deserialize, Serialize};

use super::{KeyString, ObjectMap, Value, TAGS_KEY};

/// A single record flowing through the pipeline.
///
/// The event owns all of its data. Cloning produces a fully independent deep
/// copy, including nested objects and the `tags` list, so two clones can be
/// mutated without observing each other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEvent {
    fields: ObjectMap,
}

impl LogEvent {
    pub fn from_map(fields: ObjectMap) -> Self {
        Self { fields }
    }

    pub fn into_map(self) -> ObjectMap {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Sets `key` to `value`, returning the previous value. An existing key
    /// keeps its position; a new key is appended.
    pub fn insert(&mut self, key: impl Into<KeyString>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Removes `key`, keeping the relative order of the remaining fields.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the string entries of the `tags` field.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.fields
            .get(TAGS_KEY)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().any(|t| t == tag)
    }

    /// Appends `tag` to the `tags` field unless it is already there.
    ///
    /// A `tags` field that is not an array is converted into one holding the
    /// previous value first, so no data is lost.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let tags = self
            .fields
            .entry(TAGS_KEY.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));

        if !matches!(tags, Value::Array(_)) {
            *tags = match mem::replace(tags, Value::Null) {
                Value::Null => Value::Array(Vec::new()),
                previous => Value::Array(vec![previous]),
            };
        }

        if let Value::Array(tags) = tags {
            if !tags.iter().any(|t| t.as_str() == Some(tag.as_str())) {
                tags.push(Value::String(tag));
            }
        }
    }
}

impl From<ObjectMap> for LogEvent {
    fn from(fields: ObjectMap) -> Self {
        Self::from_map(fields)
    }
}

impl<K: Into<KeyString>, V: Into<Value>> FromIterator<(K, V)> for LogEvent {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for LogEvent {
    type Error = serde_json::Value;

    /// Only JSON objects can become events; anything else is handed back.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(other),
        }
    }
}
