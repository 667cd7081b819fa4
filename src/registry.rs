//! Association registry - per-type relationship metadata storage
//!
//! An explicit registry object built once at startup by the schema layer and
//! read-only thereafter; no global state. Relationship names are unique
//! within their owning type across all four shapes, so `resolve` is a single
//! lookup and dispatch happens on the association's own kind.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::association::Association;
use crate::error::{PopulateError, PopulateResult};

/// Registry mapping record type names to their declared associations
#[derive(Debug, Clone, Default)]
pub struct AssociationRegistry {
    /// Map of type name -> association name -> declaration, in declaration order
    associations: HashMap<String, IndexMap<String, Association>>,
}

impl AssociationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            associations: HashMap::new(),
        }
    }

    /// Register a validated association on a record type
    ///
    /// Fails with `DuplicateAssociation` if the name is already declared on
    /// the type under any shape, and with `Configuration` if the declaration
    /// itself is inconsistent. Declaration-time failures are fatal to startup.
    pub fn declare(&mut self, type_name: &str, association: Association) -> PopulateResult<()> {
        association.validate()?;

        let declared = self.associations.entry(type_name.to_string()).or_default();
        if declared.contains_key(&association.name) {
            return Err(PopulateError::DuplicateAssociation {
                type_name: type_name.to_string(),
                name: association.name,
            });
        }

        declared.insert(association.name.clone(), association);
        Ok(())
    }

    /// Declare a belongs-to relationship
    pub fn declare_belongs_to(
        &mut self,
        type_name: &str,
        name: &str,
        target_type: &str,
        local_field: &str,
        foreign_field: &str,
    ) -> PopulateResult<()> {
        self.declare(
            type_name,
            Association::belongs_to(name, target_type, local_field, foreign_field),
        )
    }

    /// Declare a has-one relationship
    pub fn declare_has_one(
        &mut self,
        type_name: &str,
        name: &str,
        target_type: &str,
        foreign_field: &str,
    ) -> PopulateResult<()> {
        self.declare(type_name, Association::has_one(name, target_type, foreign_field))
    }

    /// Declare a has-many relationship
    pub fn declare_has_many(
        &mut self,
        type_name: &str,
        name: &str,
        target_type: &str,
        foreign_field: &str,
    ) -> PopulateResult<()> {
        self.declare(type_name, Association::has_many(name, target_type, foreign_field))
    }

    /// Declare a polymorphic relationship
    pub fn declare_polymorphic(
        &mut self,
        type_name: &str,
        name: &str,
        candidate_types: Vec<String>,
        local_field: &str,
        foreign_field: &str,
        type_field: &str,
    ) -> PopulateResult<()> {
        self.declare(
            type_name,
            Association::polymorphic(name, candidate_types, local_field, foreign_field, type_field),
        )
    }

    /// Resolve a relationship name on a record type
    pub fn resolve(&self, type_name: &str, name: &str) -> PopulateResult<&Association> {
        self.associations
            .get(type_name)
            .and_then(|declared| declared.get(name))
            .ok_or_else(|| PopulateError::UnknownAssociation {
                type_name: type_name.to_string(),
                name: name.to_string(),
            })
    }

    /// Whether a relationship is declared on a type
    pub fn has(&self, type_name: &str, name: &str) -> bool {
        self.associations
            .get(type_name)
            .map(|declared| declared.contains_key(name))
            .unwrap_or(false)
    }

    /// All relationship names declared on a type, in declaration order
    pub fn names_for(&self, type_name: &str) -> Vec<&str> {
        self.associations
            .get(type_name)
            .map(|declared| declared.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// All associations declared on a type, in declaration order
    pub fn associations_for(&self, type_name: &str) -> impl Iterator<Item = &Association> {
        self.associations
            .get(type_name)
            .into_iter()
            .flat_map(|declared| declared.values())
    }

    /// Total number of declared associations across all types
    pub fn len(&self) -> usize {
        self.associations.values().map(IndexMap::len).sum()
    }

    /// Whether any associations are declared
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
