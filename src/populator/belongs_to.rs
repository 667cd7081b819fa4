//! BelongsTo strategy - the owning record holds the foreign key
//!
//! Collection mode issues exactly one `find_by_id_set` lookup per populate
//! call regardless of input size: distinct non-null foreign keys are
//! collected across all owners, fetched in one batch, recursed into with the
//! child selection, and spliced back through a keyed table.

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::{debug, trace};

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
    if association.kind != AssociationKind::BelongsTo {
        return Err(PopulateError::UnsupportedAssociation {
            type_name: type_name.to_string(),
            name: association.name.clone(),
            kind: association.kind,
        });
    }

    let local_field = required_local_field(association)?;
    let target_type = association.target_type().ok_or_else(|| {
        PopulateError::Configuration(format!(
            "belongs-to association '{}' has no fixed target type",
            association.name
        ))
    })?;
    let projection = Projection::for_relation(selection, &association.foreign_field);

    match input {
        Input::Single(record) => {
            let Some(key) = record.key(local_field) else {
                record.set_relation(&association.name, RelationValue::One(None));
                return Ok(());
            };

            let handle = populator.types().lookup_type(target_type)?;
            debug!(target = target_type, "belongs_to point lookup");
            let fetched = handle.find_by_id(&key, projection.as_ref()).await?;

            let value = match fetched {
                Some(mut related) => {
                    populator
                        .populate_slice(target_type, std::slice::from_mut(&mut related), selection)
                        .await?;
                    RelationValue::One(Some(related))
                }
                None => RelationValue::One(None),
            };
            record.set_relation(&association.name, value);
            Ok(())
        }
        Input::Collection(records) => {
            let keys: IndexSet<String> = records
                .iter()
                .filter_map(|record| record.key(local_field))
                .collect();

            if keys.is_empty() {
                for record in records.iter_mut() {
                    record.set_relation(&association.name, RelationValue::One(None));
                }
                return Ok(());
            }

            let handle = populator.types().lookup_type(target_type)?;
            let key_list: Vec<String> = keys.into_iter().collect();
            debug!(
                target = target_type,
                keys = key_list.len(),
                owners = records.len(),
                "belongs_to batched lookup"
            );
            let mut fetched = handle.find_by_id_set(&key_list, projection.as_ref()).await?;

            populator
                .populate_slice(target_type, &mut fetched, selection)
                .await?;

            let table: HashMap<String, Record> = fetched
                .into_iter()
                .filter_map(|related| {
                    related
                        .key(&association.foreign_field)
                        .map(|key| (key, related))
                })
                .collect();

            for record in records.iter_mut() {
                let related = record
                    .key(local_field)
                    .and_then(|key| table.get(&key).cloned());
                trace!(association = %association.name, hit = related.is_some(), "splicing belongs_to");
                record.set_relation(&association.name, RelationValue::One(related));
            }
            Ok(())
        }
    }
}

fn required_local_field(association: &Association) -> PopulateResult<&str> {
    association.local_field.as_deref().ok_or_else(|| {
        PopulateError::Configuration(format!(
            "belongs-to association '{}' has no local field",
            association.name
        ))
    })
}
