//! Store interfaces - the injected document-store boundary
//!
//! The engine never talks to a store directly; it resolves a target type name
//! through a `TypeRegistry` and issues batched lookups through the returned
//! `TypeHandle`. Query execution, retries and timeouts all live behind these
//! traits. Lookup failures propagate unchanged.

use async_trait::async_trait;

use crate::error::PopulateResult;
use crate::record::{Record, ID_FIELD};
use crate::selection::SelectionTree;

/// Field-inclusion list handed to the store so it can avoid over-fetching
///
/// Derived from the child selection of the relationship being resolved. The
/// identity field and the relationship's link field are always included, so
/// a store may apply the projection strictly and the fetched records still
/// carry the keys splicing and recursion depend on. A store is also free to
/// ignore the projection entirely and return full records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    /// Build a projection from explicit field names
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Translate a child selection into the projection for one relationship
    ///
    /// Includes the identity field, the relationship's link field and the
    /// child selection's root names, deduplicated. Returns `None` for an
    /// empty selection: no narrowing, fetch everything.
    pub fn for_relation(selection: &SelectionTree, link_field: &str) -> Option<Self> {
        if selection.is_empty() {
            return None;
        }
        let mut fields = vec![ID_FIELD.to_string()];
        if link_field != ID_FIELD {
            fields.push(link_field.to_string());
        }
        for root in selection.roots() {
            if !fields.iter().any(|field| field == root) {
                fields.push(root.to_string());
            }
        }
        Some(Self { fields })
    }

    /// Whether a field survives this projection
    pub fn includes(&self, field: &str) -> bool {
        self.fields.iter().any(|included| included == field)
    }

    /// The included field names
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// A queryable handle for one registered record type
#[async_trait]
pub trait TypeHandle: Send + Sync {
    /// The record type this handle queries
    fn type_name(&self) -> &str;

    /// Find a single record by identity key
    async fn find_by_id(
        &self,
        id: &str,
        projection: Option<&Projection>,
    ) -> PopulateResult<Option<Record>>;

    /// Find all records whose identity key is in the given set
    async fn find_by_id_set(
        &self,
        ids: &[String],
        projection: Option<&Projection>,
    ) -> PopulateResult<Vec<Record>>;

    /// Find all records whose `field` value is in the given key set
    async fn find_by_foreign_key_set(
        &self,
        field: &str,
        keys: &[String],
        projection: Option<&Projection>,
    ) -> PopulateResult<Vec<Record>>;
}

/// Resolves record type names to queryable handles
pub trait TypeRegistry: Send + Sync {
    /// Look up a type by name, failing with `UnknownType` when unregistered
    fn lookup_type(&self, name: &str) -> PopulateResult<&dyn TypeHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_from_empty_selection() {
        assert_eq!(Projection::for_relation(&SelectionTree::new(), "car_id"), None);
    }

    #[test]
    fn test_projection_retains_identity_and_link_fields() {
        let selection = SelectionTree::from_paths(["parts.supplier", "inspections"]);
        let projection = Projection::for_relation(&selection, "car_id").unwrap();
        assert_eq!(projection.fields(), ["id", "car_id", "parts", "inspections"]);
        assert!(projection.includes("car_id"));
        assert!(!projection.includes("supplier"));
    }

    #[test]
    fn test_projection_deduplicates_identity_link_field() {
        let selection = SelectionTree::from_path("manufacturer");
        let projection = Projection::for_relation(&selection, "id").unwrap();
        assert_eq!(projection.fields(), ["id", "manufacturer"]);
    }
}
