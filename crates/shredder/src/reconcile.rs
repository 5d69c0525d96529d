//! Change reconciliation: bring a local result list in line with one change
//! event from the producer.
//!
//! Events carrying offsets are applied positionally; events without offsets
//! fall back to an identity lookup on the element `id`. The producer is
//! authoritative, so a failed lookup is a protocol violation and surfaces as
//! [`ShredderError::Reconcile`] rather than being papered over.

use crate::change::{Change, ChangeKind};
use crate::error::{Result, ShredderError};
use crate::node::{ListSlots, Node};

fn reconcile_error(change: &Change) -> ShredderError {
    ShredderError::Reconcile {
        change: change.to_json(),
    }
}

/// Index of the element whose `id` matches the change, ignoring `skip`.
fn position_by_id(list: &ListSlots, change: &Change, skip: Option<usize>) -> Result<usize> {
    let id = change.old_id().ok_or_else(|| reconcile_error(change))?;
    list.iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != skip)
        .find(|(_, slot)| slot.as_ref().and_then(|entity| entity.get_key("id")) == Some(id))
        .map(|(idx, _)| idx)
        .ok_or_else(|| reconcile_error(change))
}

fn check_offset(list: &ListSlots, offset: usize, change: &Change) -> Result<usize> {
    if offset >= list.len() {
        return Err(reconcile_error(change));
    }
    Ok(offset)
}

fn insert_at(list: &mut ListSlots, offset: usize, entity: Option<Node>) {
    let offset = offset.min(list.len());
    list.insert(offset, entity);
}

/// Apply one change event to `list` in place.
///
/// Every lookup runs before the first edit, so on error `list` is unchanged.
pub fn reconcile(list: &mut ListSlots, change: &Change) -> Result<()> {
    match &change.kind {
        ChangeKind::Remove | ChangeKind::Uninitial => {
            let idx = match change.old_offset {
                Some(offset) => check_offset(list, offset, change)?,
                None => position_by_id(list, change, None)?,
            };
            list.remove(idx);
        }
        ChangeKind::Add | ChangeKind::Initial => match change.new_offset {
            Some(offset) => insert_at(list, offset, change.new_val.clone()),
            // Unordered results go to the end
            None => list.push(change.new_val.clone()),
        },
        ChangeKind::Change => {
            let removed = change
                .old_offset
                .map(|offset| check_offset(list, offset, change))
                .transpose()?;
            match change.new_offset {
                Some(offset) => {
                    if let Some(removed) = removed {
                        list.remove(removed);
                    }
                    insert_at(list, offset, change.new_val.clone());
                }
                None => {
                    let idx = position_by_id(list, change, removed)?;
                    let idx = match removed {
                        Some(removed) => {
                            list.remove(removed);
                            if idx > removed { idx - 1 } else { idx }
                        }
                        None => idx,
                    };
                    list[idx] = change.new_val.clone();
                }
            }
        }
        // Nothing emitted yet
        ChangeKind::State => {}
        ChangeKind::Other(_) => {
            return Err(ShredderError::UnrecognizedChange {
                change: change.to_json(),
            })
        }
    }
    tracing::trace!(kind = change.kind.as_str(), len = list.len(), "change reconciled");
    Ok(())
}

/// Apply one change event to `list`, returning the reconciled list.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use shredder::{apply_change, Change, Node};
///
/// let change = Change::from_json(&json!({"type": "add", "new_val": {"id": 1, "name": "x"}})).unwrap();
/// let list = apply_change(Vec::new(), &change).unwrap();
/// assert_eq!(list, vec![Some(Node::from(json!({"id": 1, "name": "x"})))]);
/// ```
pub fn apply_change(mut list: ListSlots, change: &Change) -> Result<ListSlots> {
    reconcile(&mut list, change)?;
    Ok(list)
}
