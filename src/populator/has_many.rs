//! HasMany strategy - related records point back at their owner
//!
//! One `find_by_foreign_key_set` lookup covers every owner in the input.
//! Matches accumulate per owner in store return order; owners with no
//! matches get an empty sequence, never an unpopulated slot.

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
    if association.kind != AssociationKind::HasMany {
        return Err(PopulateError::UnsupportedAssociation {
            type_name: type_name.to_string(),
            name: association.name.clone(),
            kind: association.kind,
        });
    }

    let target_type = association.target_type().ok_or_else(|| {
        PopulateError::Configuration(format!(
            "has-many association '{}' has no fixed target type",
            association.name
        ))
    })?;

    let records = input.into_slice();
    let owner_keys: IndexSet<String> = records.iter().filter_map(Record::id).collect();

    if owner_keys.is_empty() {
        for record in records.iter_mut() {
            record.set_relation(&association.name, RelationValue::Many(Vec::new()));
        }
        return Ok(());
    }

    let handle = populator.types().lookup_type(target_type)?;
    let key_list: Vec<String> = owner_keys.into_iter().collect();
    debug!(
        target = target_type,
        field = %association.foreign_field,
        keys = key_list.len(),
        "has_many batched lookup"
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

    let mut table: HashMap<String, Vec<Record>> = HashMap::new();
    for related in fetched {
        if let Some(key) = related.key(&association.foreign_field) {
            table.entry(key).or_default().push(related);
        }
    }

    for record in records.iter_mut() {
        let related = record
            .id()
            .and_then(|id| table.get(&id).cloned())
            .unwrap_or_default();
        record.set_relation(&association.name, RelationValue::Many(related));
    }
    Ok(())
}
