//! Patch generation: compute the operations that turn one document into
//! another.
//!
//! Objects are diffed key by key, arrays element by element over their common
//! prefix followed by tail insertions or removals. Everything else becomes a
//! `replace`.

use serde_json::{Map, Value};

use crate::types::Op;

// ── Public API ────────────────────────────────────────────────────────────

/// Generate a patch (list of operations) that transforms `src` into `dst`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use shredder_patch::{apply_patch, diff};
///
/// let src = json!({"x": 1, "tags": ["a"]});
/// let dst = json!({"x": 2, "tags": ["a", "b"]});
/// let ops = diff(&src, &dst);
/// assert_eq!(apply_patch(src, &ops).unwrap(), dst);
/// ```
pub fn diff(src: &Value, dst: &Value) -> Vec<Op> {
    let mut ops = Vec::new();
    diff_at_path(&mut ops, &[], src, dst);
    ops
}

// ── Core recursive differ ─────────────────────────────────────────────────

fn diff_at_path(ops: &mut Vec<Op>, path: &[String], src: &Value, dst: &Value) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_obj(ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_arr(ops, path, s, d),
        _ => ops.push(Op::Replace {
            path: path.to_vec(),
            value: dst.clone(),
            old_value: None,
        }),
    }
}

fn child(path: &[String], step: impl Into<String>) -> Vec<String> {
    let mut p = path.to_vec();
    p.push(step.into());
    p
}

fn diff_obj(ops: &mut Vec<Op>, path: &[String], src: &Map<String, Value>, dst: &Map<String, Value>) {
    // Remove keys in src that are not in dst
    for key in src.keys() {
        if !dst.contains_key(key) {
            ops.push(Op::Remove {
                path: child(path, key.clone()),
                old_value: None,
            });
        }
    }
    // Add/replace keys in dst
    for (key, dst_val) in dst {
        let p = child(path, key.clone());
        match src.get(key) {
            None => ops.push(Op::Add {
                path: p,
                value: dst_val.clone(),
            }),
            Some(src_val) => diff_at_path(ops, &p, src_val, dst_val),
        }
    }
}

fn diff_arr(ops: &mut Vec<Op>, path: &[String], src: &[Value], dst: &[Value]) {
    let common = src.len().min(dst.len());
    for i in 0..common {
        diff_at_path(ops, &child(path, i.to_string()), &src[i], &dst[i]);
    }
    // Remove from end to avoid index shifting
    for i in (common..src.len()).rev() {
        ops.push(Op::Remove {
            path: child(path, i.to_string()),
            old_value: None,
        });
    }
    for (i, v) in dst.iter().enumerate().skip(common) {
        ops.push(Op::Add {
            path: child(path, i.to_string()),
            value: v.clone(),
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
