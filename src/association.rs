//! Association metadata - the declared shape of a relationship
//!
//! The shape is a tagged variant fixed at declaration time, so resolution
//! dispatches in O(1) by matching on the kind rather than probing each shape
//! in turn.

use serde::{Deserialize, Serialize};

use crate::error::{PopulateError, PopulateResult};

/// The four relationship shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationKind {
    /// Owning record stores the foreign key pointing at one related record
    BelongsTo,
    /// Related record stores the foreign key; at most one match per owner
    HasOne,
    /// Related record stores the foreign key; a sequence of matches per owner
    HasMany,
    /// BelongsTo whose target type is stored per-record in a discriminator field
    Polymorphic,
}

impl AssociationKind {
    /// Returns true if this shape resolves to a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::HasMany)
    }

    /// Returns true if the target type is decided per-record
    pub fn is_polymorphic(self) -> bool {
        matches!(self, Self::Polymorphic)
    }
}

/// Which record type(s) an association may fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssociationTarget {
    /// Fixed target type, known at declaration time
    Type(String),
    /// Target type read per-record from a discriminator field
    Discriminated {
        /// Field on the owning record naming the target type
        type_field: String,
        /// Legal target type names for the discriminator
        candidate_types: Vec<String>,
    },
}

/// A declared relationship on a record type, immutable after declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    /// Relationship shape
    pub kind: AssociationKind,

    /// Relationship name, unique per owning type
    pub name: String,

    /// Field on the owning record holding the foreign key
    /// (BelongsTo and Polymorphic only)
    pub local_field: Option<String>,

    /// Field on the related record holding the linking key: the related
    /// identity field for BelongsTo/Polymorphic, the back-reference for
    /// HasOne/HasMany
    pub foreign_field: String,

    /// Target type(s)
    pub target: AssociationTarget,
}

impl Association {
    /// Declare a belongs-to relationship
    pub fn belongs_to(name: &str, target_type: &str, local_field: &str, foreign_field: &str) -> Self {
        Self {
            kind: AssociationKind::BelongsTo,
            name: name.to_string(),
            local_field: Some(local_field.to_string()),
            foreign_field: foreign_field.to_string(),
            target: AssociationTarget::Type(target_type.to_string()),
        }
    }

    /// Declare a has-one relationship
    pub fn has_one(name: &str, target_type: &str, foreign_field: &str) -> Self {
        Self {
            kind: AssociationKind::HasOne,
            name: name.to_string(),
            local_field: None,
            foreign_field: foreign_field.to_string(),
            target: AssociationTarget::Type(target_type.to_string()),
        }
    }

    /// Declare a has-many relationship
    pub fn has_many(name: &str, target_type: &str, foreign_field: &str) -> Self {
        Self {
            kind: AssociationKind::HasMany,
            name: name.to_string(),
            local_field: None,
            foreign_field: foreign_field.to_string(),
            target: AssociationTarget::Type(target_type.to_string()),
        }
    }

    /// Declare a polymorphic relationship
    pub fn polymorphic(
        name: &str,
        candidate_types: Vec<String>,
        local_field: &str,
        foreign_field: &str,
        type_field: &str,
    ) -> Self {
        Self {
            kind: AssociationKind::Polymorphic,
            name: name.to_string(),
            local_field: Some(local_field.to_string()),
            foreign_field: foreign_field.to_string(),
            target: AssociationTarget::Discriminated {
                type_field: type_field.to_string(),
                candidate_types,
            },
        }
    }

    /// The fixed target type name, if this association has one
    pub fn target_type(&self) -> Option<&str> {
        match &self.target {
            AssociationTarget::Type(name) => Some(name),
            AssociationTarget::Discriminated { .. } => None,
        }
    }

    /// Validate the declaration for internal consistency
    pub fn validate(&self) -> PopulateResult<()> {
        if self.name.is_empty() {
            return Err(PopulateError::Configuration(
                "association name cannot be empty".to_string(),
            ));
        }

        if self.foreign_field.is_empty() {
            return Err(PopulateError::Configuration(format!(
                "association '{}' must declare a foreign field",
                self.name
            )));
        }

        match self.kind {
            AssociationKind::BelongsTo | AssociationKind::Polymorphic => {
                match &self.local_field {
                    Some(field) if !field.is_empty() => {}
                    _ => {
                        return Err(PopulateError::Configuration(format!(
                            "association '{}' of shape {:?} must declare a local field",
                            self.name, self.kind
                        )));
                    }
                }
            }
            AssociationKind::HasOne | AssociationKind::HasMany => {
                if self.local_field.is_some() {
                    return Err(PopulateError::Configuration(format!(
                        "association '{}' of shape {:?} must not declare a local field",
                        self.name, self.kind
                    )));
                }
            }
        }

        match (&self.kind, &self.target) {
            (AssociationKind::Polymorphic, AssociationTarget::Discriminated { type_field, candidate_types }) => {
                if type_field.is_empty() {
                    return Err(PopulateError::Configuration(format!(
                        "polymorphic association '{}' must declare a type field",
                        self.name
                    )));
                }
                if candidate_types.is_empty() {
                    return Err(PopulateError::Configuration(format!(
                        "polymorphic association '{}' must declare at least one candidate type",
                        self.name
                    )));
                }
                if Some(type_field.as_str()) == self.local_field.as_deref() {
                    return Err(PopulateError::Configuration(format!(
                        "polymorphic association '{}' must use distinct key and type fields",
                        self.name
                    )));
                }
                Ok(())
            }
            (AssociationKind::Polymorphic, AssociationTarget::Type(_)) => {
                Err(PopulateError::Configuration(format!(
                    "polymorphic association '{}' requires a discriminated target",
                    self.name
                )))
            }
            (_, AssociationTarget::Discriminated { .. }) => {
                Err(PopulateError::Configuration(format!(
                    "association '{}' of shape {:?} requires a fixed target type",
                    self.name, self.kind
                )))
            }
            (_, AssociationTarget::Type(target)) => {
                if target.is_empty() {
                    return Err(PopulateError::Configuration(format!(
                        "association '{}' must declare a target type",
                        self.name
                    )));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_properties() {
        assert!(AssociationKind::HasMany.is_collection());
        assert!(!AssociationKind::HasOne.is_collection());
        assert!(AssociationKind::Polymorphic.is_polymorphic());
        assert!(!AssociationKind::BelongsTo.is_polymorphic());
    }

    #[test]
    fn test_belongs_to_declaration() {
        let assoc = Association::belongs_to("manufacturer", "Manufacturer", "manufacturer_id", "id");
        assert_eq!(assoc.kind, AssociationKind::BelongsTo);
        assert_eq!(assoc.local_field.as_deref(), Some("manufacturer_id"));
        assert_eq!(assoc.target_type(), Some("Manufacturer"));
        assert!(assoc.validate().is_ok());
    }

    #[test]
    fn test_has_many_rejects_local_field() {
        let mut assoc = Association::has_many("assemblies", "Assembly", "car_id");
        assert!(assoc.validate().is_ok());

        assoc.local_field = Some("assembly_id".to_string());
        assert!(assoc.validate().is_err());
    }

    #[test]
    fn test_polymorphic_validation() {
        let assoc = Association::polymorphic(
            "rateable",
            vec!["Car".to_string(), "Bike".to_string()],
            "rateable_id",
            "id",
            "rateable_type",
        );
        assert!(assoc.validate().is_ok());
        assert_eq!(assoc.target_type(), None);

        let no_candidates =
            Association::polymorphic("rateable", vec![], "rateable_id", "id", "rateable_type");
        assert!(no_candidates.validate().is_err());

        let clashing_fields = Association::polymorphic(
            "rateable",
            vec!["Car".to_string()],
            "rateable_id",
            "id",
            "rateable_id",
        );
        assert!(clashing_fields.validate().is_err());
    }

    #[test]
    fn test_missing_local_field_rejected() {
        let mut assoc = Association::belongs_to("manufacturer", "Manufacturer", "manufacturer_id", "id");
        assoc.local_field = None;
        assert!(assoc.validate().is_err());
    }
}
