//! Patch apply logic.

use serde_json::Value;
use shredder_path::{format_json_pointer, is_valid_index};

use super::types::{Op, PatchError};

// ── Path navigation ───────────────────────────────────────────────────────

/// Immutable navigation to the value at `path`.
fn get_at<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    doc.pointer(&format_json_pointer(path))
}

/// Mutable navigation to the value at `path` (must exist).
fn get_mut_at<'a>(doc: &'a mut Value, path: &[String]) -> Result<&'a mut Value, PatchError> {
    doc.pointer_mut(&format_json_pointer(path))
        .ok_or(PatchError::NotFound)
}

fn parse_index(key: &str) -> Result<usize, PatchError> {
    if !is_valid_index(key) {
        return Err(PatchError::InvalidIndex);
    }
    key.parse().map_err(|_| PatchError::InvalidIndex)
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match get_mut_at(doc, parent_path)? {
        Value::Object(map) => Ok(map.insert(key.clone(), value)),
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(None);
            }
            let idx = parse_index(key)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Err(PatchError::InvalidTarget);
    };
    match get_mut_at(doc, parent_path)? {
        Value::Object(map) => map.shift_remove(key).ok_or(PatchError::NotFound).map(Some),
        Value::Array(arr) => {
            let idx = parse_index(key)?;
            if idx >= arr.len() {
                return Err(PatchError::NotFound);
            }
            Ok(Some(arr.remove(idx)))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match get_mut_at(doc, parent_path)? {
        Value::Object(map) => {
            let slot = map.get_mut(key).ok_or(PatchError::NotFound)?;
            Ok(Some(std::mem::replace(slot, value)))
        }
        Value::Array(arr) => {
            let idx = parse_index(key)?;
            let slot = arr.get_mut(idx).ok_or(PatchError::NotFound)?;
            Ok(Some(std::mem::replace(slot, value)))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    let src = get_at(doc, from).ok_or(PatchError::NotFound)?.clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    // A location cannot be moved into one of its own children
    if path.len() > from.len() && path[..from.len()] == *from {
        return Err(PatchError::InvalidTarget);
    }
    let value = apply_remove(doc, from)?.ok_or(PatchError::NotFound)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value, not: bool) -> Result<(), PatchError> {
    let actual = get_at(doc, path).ok_or(PatchError::NotFound)?;
    if (actual == value) == not {
        Err(PatchError::Test)
    } else {
        Ok(())
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Apply a single operation in place, returning the displaced value if any.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<Option<Value>, PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path, .. } => apply_remove(doc, path),
        Op::Replace { path, value, .. } => apply_replace(doc, path, value.clone()),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Test { path, value, not } => {
            apply_test(doc, path, value, *not)?;
            Ok(None)
        }
    }
}

/// Apply a sequence of operations to `doc`, returning the patched document.
///
/// The input is consumed; on error nothing is returned, so callers holding a
/// clone of the original keep an untouched copy.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use shredder_patch::{apply_patch, Op};
///
/// let ops = vec![Op::Replace { path: vec!["x".into()], value: json!(2), old_value: None }];
/// assert_eq!(apply_patch(json!({"x": 1}), &ops).unwrap(), json!({"x": 2}));
/// ```
pub fn apply_patch(mut doc: Value, ops: &[Op]) -> Result<Value, PatchError> {
    for op in ops {
        apply_op(&mut doc, op)?;
    }
    Ok(doc)
}

// ── Tests ─────────────────────────────────────────────────────────────────
