//! Polymorphic strategy - the target type is stored per-record
//!
//! Collection mode groups owners by their discriminator value and issues one
//! batched lookup per distinct type actually present in the input; candidate
//! types nobody references incur zero lookups. Records with a missing
//! discriminator or foreign key resolve to a null slot without a lookup.
//! Single and collection mode both recurse into the fetched record with the
//! child selection.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::association::{Association, AssociationKind, AssociationTarget};
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
    if association.kind != AssociationKind::Polymorphic {
        return Err(PopulateError::UnsupportedAssociation {
            type_name: type_name.to_string(),
            name: association.name.clone(),
            kind: association.kind,
        });
    }

    let local_field = association.local_field.as_deref().ok_or_else(|| {
        PopulateError::Configuration(format!(
            "polymorphic association '{}' has no local field",
            association.name
        ))
    })?;
    let type_field = match &association.target {
        AssociationTarget::Discriminated { type_field, .. } => type_field.as_str(),
        AssociationTarget::Type(_) => {
            return Err(PopulateError::Configuration(format!(
                "polymorphic association '{}' has no discriminator field",
                association.name
            )));
        }
    };
    let projection = Projection::for_relation(selection, &association.foreign_field);

    match input {
        Input::Single(record) => {
            let (Some(target_type), Some(key)) = (record.key(type_field), record.key(local_field))
            else {
                record.set_relation(&association.name, RelationValue::One(None));
                return Ok(());
            };

            let handle = populator.types().lookup_type(&target_type)?;
            debug!(target = %target_type, "polymorphic point lookup");
            let fetched = handle.find_by_id(&key, projection.as_ref()).await?;

            let value = match fetched {
                Some(mut related) => {
                    populator
                        .populate_slice(&target_type, std::slice::from_mut(&mut related), selection)
                        .await?;
                    RelationValue::One(Some(related))
                }
                None => RelationValue::One(None),
            };
            record.set_relation(&association.name, value);
            Ok(())
        }
        Input::Collection(records) => {
            // one group per discriminator value present, in first-seen order
            let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
            for (index, record) in records.iter().enumerate() {
                match (record.key(type_field), record.key(local_field)) {
                    (Some(target_type), Some(_)) => {
                        groups.entry(target_type).or_default().push(index);
                    }
                    _ => {}
                }
            }

            // owners that cannot be resolved still get a populated slot
            for record in records.iter_mut() {
                record.set_relation(&association.name, RelationValue::One(None));
            }

            for (target_type, members) in groups {
                let keys: IndexSet<String> = members
                    .iter()
                    .filter_map(|&index| records[index].key(local_field))
                    .collect();

                let handle = populator.types().lookup_type(&target_type)?;
                let key_list: Vec<String> = keys.into_iter().collect();
                debug!(
                    target = %target_type,
                    keys = key_list.len(),
                    owners = members.len(),
                    "polymorphic batched lookup"
                );
                let mut fetched = handle.find_by_id_set(&key_list, projection.as_ref()).await?;

                populator
                    .populate_slice(&target_type, &mut fetched, selection)
                    .await?;

                let table: HashMap<String, Record> = fetched
                    .into_iter()
                    .filter_map(|related| {
                        related
                            .key(&association.foreign_field)
                            .map(|key| (key, related))
                    })
                    .collect();

                for index in members {
                    let related = records[index]
                        .key(local_field)
                        .and_then(|key| table.get(&key).cloned());
                    records[index].set_relation(&association.name, RelationValue::One(related));
                }
            }
            Ok(())
        }
    }
}
