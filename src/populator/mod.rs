//! Populator - batched association resolution
//!
//! Given a record type, a record or collection, and a selection tree, the
//! populator iterates root relationship names in selection order, resolves
//! each declared shape through the registry, and hands all input records to
//! the matching strategy in one call. Strategies batch their store lookups
//! across the whole input before recursing into the fetched records with the
//! root's child selection, so lookup count scales with relationship depth,
//! never with input size.

pub mod belongs_to;
pub mod has_many;
pub mod has_one;
pub mod polymorphic;

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::association::AssociationKind;
use crate::error::PopulateResult;
use crate::record::Record;
use crate::registry::AssociationRegistry;
use crate::selection::SelectionTree;
use crate::store::TypeRegistry;

/// A strategy's input: one record or a whole collection
///
/// Single and collection mode differ only where the store interface does
/// (a point lookup versus a keyed batch); strategies that batch uniformly
/// flatten a single record into a one-element slice.
pub(crate) enum Input<'r> {
    Single(&'r mut Record),
    Collection(&'r mut [Record]),
}

impl<'r> Input<'r> {
    /// View the input as a mutable slice regardless of mode
    pub(crate) fn into_slice(self) -> &'r mut [Record] {
        match self {
            Input::Single(record) => std::slice::from_mut(record),
            Input::Collection(records) => records,
        }
    }
}

/// Association-population engine over an injected registry and store
pub struct Populator<'a> {
    registry: &'a AssociationRegistry,
    types: &'a dyn TypeRegistry,
}

impl<'a> Populator<'a> {
    /// Create a populator over a built registry and a type registry
    pub fn new(registry: &'a AssociationRegistry, types: &'a dyn TypeRegistry) -> Self {
        Self { registry, types }
    }

    /// The association registry in use
    pub fn registry(&self) -> &AssociationRegistry {
        self.registry
    }

    /// The type registry in use
    pub(crate) fn types(&self) -> &dyn TypeRegistry {
        self.types
    }

    /// Populate the selected relationships on a single record, in place
    ///
    /// An empty selection is a no-op issuing zero lookups.
    pub async fn populate_one(
        &self,
        type_name: &str,
        record: &mut Record,
        selection: &SelectionTree,
    ) -> PopulateResult<()> {
        for root in selection.roots() {
            self.resolve_root(type_name, root, Input::Single(&mut *record), selection.children(root))
                .await?;
        }
        Ok(())
    }

    /// Populate the selected relationships on a collection of records, in place
    ///
    /// Each root relationship is resolved with batched lookups spanning the
    /// whole collection, never record by record.
    pub async fn populate_many(
        &self,
        type_name: &str,
        records: &mut [Record],
        selection: &SelectionTree,
    ) -> PopulateResult<()> {
        self.populate_slice(type_name, records, selection).await
    }

    /// Collection-mode population behind a boxed future, so strategies can
    /// recurse into fetched records
    pub(crate) fn populate_slice<'f>(
        &'f self,
        type_name: &'f str,
        records: &'f mut [Record],
        selection: &'f SelectionTree,
    ) -> Pin<Box<dyn Future<Output = PopulateResult<()>> + Send + 'f>> {
        Box::pin(async move {
            if selection.is_empty() || records.is_empty() {
                return Ok(());
            }
            for root in selection.roots() {
                self.resolve_root(type_name, root, Input::Collection(&mut *records), selection.children(root))
                    .await?;
            }
            Ok(())
        })
    }

    /// Resolve one root relationship: registry lookup, then shape dispatch
    async fn resolve_root(
        &self,
        type_name: &str,
        name: &str,
        input: Input<'_>,
        selection: &SelectionTree,
    ) -> PopulateResult<()> {
        let association = self.registry.resolve(type_name, name)?;
        debug!(
            owner = type_name,
            association = name,
            kind = ?association.kind,
            "resolving association"
        );

        match association.kind {
            AssociationKind::BelongsTo => {
                belongs_to::resolve(self, type_name, association, input, selection).await
            }
            AssociationKind::HasOne => {
                has_one::resolve(self, type_name, association, input, selection).await
            }
            AssociationKind::HasMany => {
                has_many::resolve(self, type_name, association, input, selection).await
            }
            AssociationKind::Polymorphic => {
                polymorphic::resolve(self, type_name, association, input, selection).await
            }
        }
    }
}
