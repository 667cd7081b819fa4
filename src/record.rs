//! Record - an opaque keyed bag of fields belonging to one record type
//!
//! Resolved relationships live in an explicit side table of relation slots
//! rather than behind implicit property interception: a slot holds either a
//! single optional record or a collection, and a populated-with-null slot is
//! distinguishable from a never-populated one. Eviction is an ordinary
//! method (`unset_relation`), keeping mutation explicit and testable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field under which a record's identity key is stored
pub const ID_FIELD: &str = "id";

/// A resolved relationship value attached to a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationValue {
    /// Single related record, or none (BelongsTo, HasOne, Polymorphic)
    One(Option<Record>),
    /// Collection of related records, possibly empty (HasMany)
    Many(Vec<Record>),
}

impl RelationValue {
    /// Borrow the single related record, if this is a populated `One` slot
    pub fn as_one(&self) -> Option<&Record> {
        match self {
            RelationValue::One(record) => record.as_ref(),
            RelationValue::Many(_) => None,
        }
    }

    /// Borrow the related collection, if this is a `Many` slot
    pub fn as_many(&self) -> Option<&[Record]> {
        match self {
            RelationValue::One(_) => None,
            RelationValue::Many(records) => Some(records),
        }
    }
}

/// An owned record: a flat field bag plus memoized relation slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Raw fields as returned by the store
    fields: Map<String, Value>,

    /// Populated relationships, keyed by association name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    relations: IndexMap<String, RelationValue>,
}

impl Record {
    /// Create a record from a JSON object
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            relations: IndexMap::new(),
        }
    }

    /// Create a record from any JSON value, discarding non-object input
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(fields)),
            _ => None,
        }
    }

    /// Get a raw field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a raw field value
    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// The record's identity key, stringified
    pub fn id(&self) -> Option<String> {
        self.key(ID_FIELD)
    }

    /// A field value stringified for use as a lookup key
    ///
    /// Strings and numbers are both usable as keys; null, missing and
    /// structured values yield `None` (an unset reference).
    pub fn key(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Borrow all raw fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Get a populated relation slot
    pub fn relation(&self, name: &str) -> Option<&RelationValue> {
        self.relations.get(name)
    }

    /// Attach a resolved relationship value
    pub fn set_relation(&mut self, name: &str, value: RelationValue) {
        self.relations.insert(name.to_string(), value);
    }

    /// Evict a populated relationship, returning the previous value
    pub fn unset_relation(&mut self, name: &str) -> Option<RelationValue> {
        self.relations.shift_remove(name)
    }

    /// Whether a relationship has been populated, even with a null result
    pub fn is_populated(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Names of all populated relationships, in population order
    pub fn populated_relations(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).expect("object literal")
    }

    #[test]
    fn test_key_extraction() {
        let rec = record(json!({"id": "c1", "manufacturer_id": 42, "broken": null}));
        assert_eq!(rec.id(), Some("c1".to_string()));
        assert_eq!(rec.key("manufacturer_id"), Some("42".to_string()));
        assert_eq!(rec.key("broken"), None);
        assert_eq!(rec.key("missing"), None);
    }

    #[test]
    fn test_relation_slots_distinguish_null_from_unpopulated() {
        let mut rec = record(json!({"id": "c1"}));
        assert!(!rec.is_populated("manufacturer"));

        rec.set_relation("manufacturer", RelationValue::One(None));
        assert!(rec.is_populated("manufacturer"));
        assert_eq!(rec.relation("manufacturer"), Some(&RelationValue::One(None)));

        rec.unset_relation("manufacturer");
        assert!(!rec.is_populated("manufacturer"));
    }

    #[test]
    fn test_relation_value_accessors() {
        let related = record(json!({"id": "m1"}));
        let one = RelationValue::One(Some(related.clone()));
        assert_eq!(one.as_one(), Some(&related));
        assert_eq!(one.as_many(), None);

        let many = RelationValue::Many(vec![related.clone()]);
        assert_eq!(many.as_one(), None);
        assert_eq!(many.as_many().map(|r| r.len()), Some(1));
    }
}
