//! Engine-ready records.
//!
//! An [`IndexedRecord`] is the flattened field map produced from a store-of-record
//! entity. Building it from a row is the dictization layer's job; this crate only
//! carries the result to the search engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the field holding the stable record identifier.
pub const ID_FIELD: &str = "id";

/// Name of the field holding the record's display name.
pub const NAME_FIELD: &str = "name";

/// Flattened representation of an entity: field name to value or list of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexedRecord {
    fields: Map<String, Value>,
}

impl IndexedRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Minimal record used for removals: only the id is known.
    pub fn id_only(id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
        Self { fields }
    }

    /// The record's stable identifier, if the record carries one as text.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// The record's display name, if present.
    pub fn name(&self) -> Option<&str> {
        self.fields.get(NAME_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for IndexedRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// What an operator needs to locate a record that is missing from the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    pub name: String,
    pub metadata_modified: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_id_only_record() {
        let id = Uuid::new_v4().to_string();
        let record = IndexedRecord::id_only(&id);

        assert_eq!(record.id(), Some(id.as_str()));
        assert!(record.name().is_none());
        assert_eq!(record.fields().len(), 1);
    }

    #[test]
    fn test_accessors() {
        let record = IndexedRecord::id_only("abc")
            .with("name", "annual-rainfall")
            .with("tags", json!(["weather", "rain"]));

        assert_eq!(record.id(), Some("abc"));
        assert_eq!(record.name(), Some("annual-rainfall"));
        assert_eq!(record.get("tags"), Some(&json!(["weather", "rain"])));
    }

    #[test]
    fn test_non_text_id_is_not_an_id() {
        let record = IndexedRecord::default().with("id", 42);
        assert!(record.id().is_none());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let record = IndexedRecord::id_only("abc").with("title", "Rainfall");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"id": "abc", "title": "Rainfall"}));
    }
}
