//! In-memory store backend
//!
//! A reference `TypeRegistry` implementation backed by plain vectors.
//! Collections preserve insertion order, which is the store return order the
//! HasOne first-match rule and HasMany sequence order are defined against.
//! Every issued lookup is counted, so batching behavior is observable in
//! tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use crate::error::{PopulateError, PopulateResult};
use crate::record::{Record, ID_FIELD};
use crate::store::{Projection, TypeHandle, TypeRegistry};

/// One named record collection
#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    records: Vec<Record>,
    lookups: Arc<AtomicUsize>,
}

impl MemoryCollection {
    fn new(name: &str, lookups: Arc<AtomicUsize>) -> Self {
        Self {
            name: name.to_string(),
            records: Vec::new(),
            lookups,
        }
    }

    /// Insert a record built from a JSON object literal
    pub fn insert(&mut self, value: Value) -> &mut Self {
        if let Some(record) = Record::from_value(value) {
            self.records.push(record);
        }
        self
    }

    /// Insert an already-built record
    pub fn insert_record(&mut self, record: Record) -> &mut Self {
        self.records.push(record);
        self
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn count_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    // projections are applied strictly: non-included fields are dropped
    fn project(record: &Record, projection: Option<&Projection>) -> Record {
        match projection {
            Some(projection) => {
                let fields = record
                    .fields()
                    .iter()
                    .filter(|(name, _)| projection.includes(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                Record::new(fields)
            }
            None => record.clone(),
        }
    }
}

#[async_trait]
impl TypeHandle for MemoryCollection {
    fn type_name(&self) -> &str {
        &self.name
    }

    async fn find_by_id(
        &self,
        id: &str,
        projection: Option<&Projection>,
    ) -> PopulateResult<Option<Record>> {
        self.count_lookup();
        trace!(collection = %self.name, id, "find_by_id");
        Ok(self
            .records
            .iter()
            .find(|record| record.key(ID_FIELD).as_deref() == Some(id))
            .map(|record| Self::project(record, projection)))
    }

    async fn find_by_id_set(
        &self,
        ids: &[String],
        projection: Option<&Projection>,
    ) -> PopulateResult<Vec<Record>> {
        self.count_lookup();
        trace!(collection = %self.name, keys = ids.len(), "find_by_id_set");
        Ok(self
            .records
            .iter()
            .filter(|record| {
                record
                    .key(ID_FIELD)
                    .map(|id| ids.contains(&id))
                    .unwrap_or(false)
            })
            .map(|record| Self::project(record, projection))
            .collect())
    }

    async fn find_by_foreign_key_set(
        &self,
        field: &str,
        keys: &[String],
        projection: Option<&Projection>,
    ) -> PopulateResult<Vec<Record>> {
        self.count_lookup();
        trace!(collection = %self.name, field, keys = keys.len(), "find_by_foreign_key_set");
        Ok(self
            .records
            .iter()
            .filter(|record| {
                record
                    .key(field)
                    .map(|key| keys.contains(&key))
                    .unwrap_or(false)
            })
            .map(|record| Self::project(record, projection))
            .collect())
    }
}

/// In-memory type registry holding named collections
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: IndexMap<String, MemoryCollection>,
    lookups: Arc<AtomicUsize>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            collections: IndexMap::new(),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get or create a named collection for seeding
    pub fn collection(&mut self, name: &str) -> &mut MemoryCollection {
        let lookups = Arc::clone(&self.lookups);
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| MemoryCollection::new(name, lookups))
    }

    /// Total number of store lookups issued so far, across all collections
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Reset the lookup counter
    pub fn reset_lookup_count(&self) {
        self.lookups.store(0, Ordering::Relaxed);
    }
}

impl TypeRegistry for MemoryBackend {
    fn lookup_type(&self, name: &str) -> PopulateResult<&dyn TypeHandle> {
        self.collections
            .get(name)
            .map(|collection| collection as &dyn TypeHandle)
            .ok_or_else(|| PopulateError::UnknownType(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_by_id() {
        let mut backend = MemoryBackend::new();
        backend
            .collection("Car")
            .insert(json!({"id": "c1", "name": "roadster"}))
            .insert(json!({"id": "c2", "name": "wagon"}));

        let handle = backend.lookup_type("Car").unwrap();
        let found = handle.find_by_id("c2", None).await.unwrap().unwrap();
        assert_eq!(found.key("name").as_deref(), Some("wagon"));
        assert!(handle.find_by_id("c3", None).await.unwrap().is_none());
        assert_eq!(backend.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_find_by_foreign_key_set_preserves_insertion_order() {
        let mut backend = MemoryBackend::new();
        backend
            .collection("Assembly")
            .insert(json!({"id": "a2", "car_id": "c1"}))
            .insert(json!({"id": "a1", "car_id": "c1"}))
            .insert(json!({"id": "a3", "car_id": "c9"}));

        let handle = backend.lookup_type("Assembly").unwrap();
        let found = handle
            .find_by_foreign_key_set("car_id", &["c1".to_string()], None)
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);
    }

    #[test]
    fn test_unknown_type() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.lookup_type("Ghost"),
            Err(PopulateError::UnknownType(_))
        ));
    }

    #[tokio::test]
    async fn test_projection_narrows_returned_fields() {
        let mut backend = MemoryBackend::new();
        backend
            .collection("Car")
            .insert(json!({"id": "c1", "manufacturer_id": "m1", "color": "green"}));

        let handle = backend.lookup_type("Car").unwrap();
        let projection = Projection::new(vec!["id".to_string(), "manufacturer_id".to_string()]);
        let found = handle.find_by_id("c1", Some(&projection)).await.unwrap().unwrap();

        assert_eq!(found.id(), Some("c1".to_string()));
        assert_eq!(found.key("manufacturer_id").as_deref(), Some("m1"));
        assert!(found.get("color").is_none());
    }

    #[tokio::test]
    async fn test_numeric_ids_match() {
        let mut backend = MemoryBackend::new();
        backend.collection("Part").insert(json!({"id": 7, "name": "bolt"}));

        let handle = backend.lookup_type("Part").unwrap();
        let found = handle
            .find_by_id_set(&["7".to_string()], None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
