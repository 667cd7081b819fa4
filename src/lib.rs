//! # doc-populator: batched association population for document stores
//!
//! Resolves declared relationships between records fetched from a document
//! store and eagerly materializes related records in batches, avoiding
//! one-query-per-record access patterns. Four relationship shapes are
//! supported: belongs-to, has-one, has-many and polymorphic references whose
//! target type is stored per-record.
//!
//! The engine is read-path only: it mutates records in place by attaching
//! resolved relation values, and every top-level call is a fresh batched
//! resolution with no caching across calls.

pub mod association;
pub mod error;
pub mod memory;
pub mod populator;
pub mod record;
pub mod registry;
pub mod selection;
pub mod store;

// Re-export core types
pub use association::{Association, AssociationKind, AssociationTarget};
pub use error::{PopulateError, PopulateResult};
pub use memory::{MemoryBackend, MemoryCollection};
pub use populator::Populator;
pub use record::{Record, RelationValue, ID_FIELD};
pub use registry::AssociationRegistry;
pub use selection::SelectionTree;
pub use store::{Projection, TypeHandle, TypeRegistry};
