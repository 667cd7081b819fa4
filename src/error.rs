//! Error types for association population
//!
//! Declaration-time failures (duplicate or invalid associations) are fatal to
//! startup; resolution-time failures surface to the caller of `populate` and
//! are never retried here. A missing foreign key or missing related record is
//! not an error - it resolves to a null slot or an empty collection.

use crate::association::AssociationKind;

/// Result type alias for population operations
pub type PopulateResult<T> = Result<T, PopulateError>;

/// Error types for association declaration and resolution
#[derive(Debug, Clone, thiserror::Error)]
pub enum PopulateError {
    /// A requested relationship name has no declaration on the record type
    #[error("no association named '{name}' is declared on type '{type_name}'")]
    UnknownAssociation { type_name: String, name: String },

    /// A relationship name was declared twice on the same record type
    #[error("association '{name}' is already declared on type '{type_name}'")]
    DuplicateAssociation { type_name: String, name: String },

    /// A declared shape reached a strategy that cannot resolve it
    #[error("association '{name}' on type '{type_name}' has shape {kind:?} which this strategy cannot resolve")]
    UnsupportedAssociation {
        type_name: String,
        name: String,
        kind: AssociationKind,
    },

    /// A target type name could not be resolved to a queryable handle
    #[error("no record type named '{0}' is registered")]
    UnknownType(String),

    /// Invalid association configuration at declaration time
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Underlying store lookup failure, propagated unchanged
    #[error("store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PopulateError::UnknownAssociation {
            type_name: "Car".to_string(),
            name: "driver".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no association named 'driver' is declared on type 'Car'"
        );

        let err = PopulateError::UnknownType("Rating".to_string());
        assert_eq!(err.to_string(), "no record type named 'Rating' is registered");
    }
}
