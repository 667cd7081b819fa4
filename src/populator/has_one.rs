//! HasOne strategy - the related record points back at its owner
//!
//! One `find_by_foreign_key_set` lookup covers every owner in the input.
//! When several related records share the same back-reference, the first
//! match in store return order wins; later matches are dropped. This rule is
//! part of the contract and covered by tests.

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::debug;

use crate::association::{Association, AssociationKind};
use crate::error::{PopulateError, PopulateResult};
use crate::record::{Record, RelationValue};
use crate::selection::SelectionTree;
use crate::store::Projection;

use super::{Input, Populator};

pub(super) async fn resolve(
    populator: &Populator<'_>,
    type_name: &str,
    association: &Association,
    input: Input<'_>,
    selection: &SelectionTree,
) -> PopulateResult<()> {
    if association.kind != AssociationKind::HasOne {
        return Err(PopulateError::UnsupportedAssociation {
            type_name: type_name.to_string(),
            name: association.name.clone(),
            kind: association.kind,
        });
    }

    let target_type = association.target_type().ok_or_else(|| {
        PopulateError::Configuration(format!(
            "has-one association '{}' has no fixed target type",
            association.name
        ))
    })?;

    let records = input.into_slice();
    let owner_keys: IndexSet<String> = records.iter().filter_map(Record::id).collect();

    if owner_keys.is_empty() {
        for record in records.iter_mut() {
            record.set_relation(&association.name, RelationValue::One(None));
        }
        return Ok(());
    }

    let handle = populator.types().lookup_type(target_type)?;
    let key_list: Vec<String> = owner_keys.into_iter().collect();
    debug!(
        target = target_type,
        field = %association.foreign_field,
        keys = key_list.len(),
        "has_one batched lookup"
    );
    let mut fetched = handle
        .find_by_foreign_key_set(
            &association.foreign_field,
            &key_list,
            Projection::for_relation(selection, &association.foreign_field).as_ref(),
        )
        .await?;

    populator
        .populate_slice(target_type, &mut fetched, selection)
        .await?;

    // first store-order match per owner wins
    let mut table: HashMap<String, Record> = HashMap::new();
    for related in fetched {
        if let Some(key) = related.key(&association.foreign_field) {
            table.entry(key).or_insert(related);
        }
    }

    for record in records.iter_mut() {
        let related = record.id().and_then(|id| table.get(&id).cloned());
        record.set_relation(&association.name, RelationValue::One(related));
    }
    Ok(())
}
