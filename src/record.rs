//! Schema-less records, equality filters and projections.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{StoreError, Value};

/// A mapping from field name to scalar value.
///
/// Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field, returning the previous value if any.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
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

    /// Copy of this record restricted to `projection`.
    pub fn project(&self, projection: &Projection) -> Record {
        match projection {
            Projection::All => self.clone(),
            Projection::Fields(names) => self
                .fields
                .iter()
                .filter(|(name, _)| names.contains(*name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    /// Build a record from a JSON object of scalars.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, StoreError> {
        let object = json.as_object().ok_or_else(|| {
            StoreError::Validation(format!("expected a JSON object, got {}", json))
        })?;

        let mut record = Record::new();
        for (field, value) in object {
            let value = Value::from_json(value)
                .map_err(|e| StoreError::Validation(format!("field `{}`: {}", field, e)))?;
            record.fields.insert(field.clone(), value);
        }
        Ok(record)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Build a [`Record`] from `field => value` pairs.
///
/// ```
/// let user = tablestore::record! { "id" => 1, "name" => "Ada" };
/// assert_eq!(user.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($field:expr => $value:expr),+ $(,)?) => {
        $crate::Record::new()$(.with($field, $value))+
    };
}

/// Field-wise equality filter. Every field must be present and equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    fields: BTreeMap<String, Value>,
}

impl Filter {
    /// An empty filter, which matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter with a single equality condition.
    pub fn by(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(field, value)
    }

    /// Add an equality condition.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }

    /// Build a filter from a JSON object, e.g. `{"id": 1}`.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, StoreError> {
        Ok(Record::from_json(json)?.into())
    }
}

impl From<Record> for Filter {
    fn from(record: Record) -> Self {
        Filter {
            fields: record.fields,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record::from_iter(iter).into()
    }
}

/// Which fields a read returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// Every field (`*`).
    #[default]
    All,
    /// Only the named fields; names missing from a record are skipped.
    Fields(BTreeSet<String>),
}

impl Projection {
    /// Build from a column list. A `*` anywhere in the list selects all fields.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = columns.into_iter().map(Into::into).collect();
        if names.contains("*") {
            Projection::All
        } else {
            Projection::Fields(names)
        }
    }
}
