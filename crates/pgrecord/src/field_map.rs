//! Field maps and the absence-filtering normalizer.
//!
//! A [`FieldMap`] is an insertion-ordered name → [`Value`] mapping with unique keys.
//! [`FieldMap::normalized`] turns it into the ordered `(name, value)` pairs that the
//! statement builder binds positionally: the same sequence drives both the
//! placeholders and the argument list, so the two can never drift apart.

use crate::error::{OrmError, OrmResult};
use crate::record::{FieldType, Record};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Decides which values count as "not provided".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsencePolicy {
    /// Null, empty string, numeric zero and `"-"` are dropped.
    ///
    /// A field whose intended value is `0` or `""` can neither be written nor matched
    /// under this policy.
    #[default]
    ZeroIsAbsent,
    /// Only NULL is dropped; zero and empty values are written and matched as given.
    NullIsAbsent,
}

impl AbsencePolicy {
    pub fn is_absent(self, value: &Value) -> bool {
        match self {
            AbsencePolicy::ZeroIsAbsent => value.is_absent(),
            AbsencePolicy::NullIsAbsent => value.is_null(),
        }
    }
}

/// Insertion-ordered map from field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a field, returning the previous value.
    ///
    /// Re-inserting an existing name replaces its value in place and keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`FieldMap::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Ordered `(name, value)` pairs with absent values removed.
    pub fn normalized(&self, policy: AbsencePolicy) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .filter(|(_, v)| !policy.is_absent(v))
            .cloned()
            .collect()
    }

    /// Remove a field and convert it to `T`.
    ///
    /// A missing field yields [`FieldType::absent`].
    pub fn take<T: FieldType>(&mut self, name: &str) -> OrmResult<T> {
        match self.remove(name) {
            Some(value) => T::from_value(value).map_err(|message| OrmError::mapping(name, message)),
            None => Ok(T::absent()),
        }
    }

    /// Remove a nested record field and convert it to `R`.
    ///
    /// A missing or NULL field yields a record built from an empty map.
    pub fn take_record<R: Record>(&mut self, name: &str) -> OrmResult<R> {
        match self.remove(name) {
            Some(Value::Record(map)) => R::from_field_map(map),
            Some(Value::Null) | None => R::from_field_map(FieldMap::new()),
            Some(other) => Err(OrmError::mapping(
                name,
                format!("expected record, got {}", other.kind_name()),
            )),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let obj = self
            .entries
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(obj)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for FieldMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}
