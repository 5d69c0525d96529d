//! Structural reads and writes on a [`Node`] tree.
//!
//! Writers take an owned root by `&mut` and copy only the containers along
//! the written path (`Arc::make_mut`), so any snapshot still holding the old
//! root keeps seeing the old data.

use std::sync::Arc;

use shredder_path::{format_path, Segment};

use crate::error::{Result, ShredderError};
use crate::node::{ListSlots, Node};

fn index_key(segment: &Segment) -> String {
    match segment {
        Segment::Key(k) => k.clone(),
        Segment::Index(i) => i.to_string(),
    }
}

/// Locate the node at `path`. Index segments on a map match the decimal key.
pub fn get_in<'a>(root: &'a Node, path: &[Segment]) -> Option<&'a Node> {
    let mut current = root;
    for segment in path {
        current = match (current, segment) {
            (Node::Map(map), Segment::Key(key)) => map.get(key)?,
            (Node::Map(map), Segment::Index(idx)) => map.get(&idx.to_string())?,
            (Node::List(list), Segment::Index(idx)) => list.get(*idx)?.as_ref()?,
            _ => return None,
        };
    }
    Some(current)
}

/// Child of `node` at `segment`, created as an empty map when missing.
///
/// Lists are padded with absent slots up to the index.
fn child_or_insert<'a>(node: &'a mut Node, segment: &Segment) -> Option<&'a mut Node> {
    match node {
        Node::Map(map) => Some(
            Arc::make_mut(map)
                .entry(index_key(segment))
                .or_insert_with(Node::empty_map),
        ),
        Node::List(list) => {
            let idx = segment.as_index()?;
            let len = idx.checked_add(1)?;
            let list = Arc::make_mut(list);
            if list.len() < len {
                list.resize(len, None);
            }
            Some(list[idx].get_or_insert_with(Node::empty_map))
        }
        _ => None,
    }
}

/// Existing child of `node` at `segment`, without creating anything.
fn child_mut<'a>(node: &'a mut Node, segment: &Segment) -> Option<&'a mut Node> {
    match node {
        Node::Map(map) => Arc::make_mut(map).get_mut(&index_key(segment)),
        Node::List(list) => {
            let idx = segment.as_index()?;
            Arc::make_mut(list).get_mut(idx)?.as_mut()
        }
        _ => None,
    }
}

fn check_gap(len: usize, index: usize, max_gap: usize, list_path: &[Segment]) -> Result<()> {
    if index > len && index - len > max_gap {
        return Err(ShredderError::IndexOutOfRange {
            path: format_path(list_path),
            index,
        });
    }
    Ok(())
}

/// Write `value` at `path`, creating missing intermediate maps.
///
/// List slots more than `max_gap` past the end are refused.
pub fn set_in(root: &mut Node, path: &[Segment], value: Node, max_gap: usize) -> Result<()> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        if let (Node::List(list), Some(idx)) = (&*current, segment.as_index()) {
            check_gap(list.len(), idx, max_gap, &path[..depth])?;
        }
        current = child_or_insert(current, segment).ok_or_else(|| ShredderError::NotAContainer {
            path: format_path(&path[..depth]),
        })?;
    }
    *current = value;
    Ok(())
}

/// Make sure every container directly addressed by a numeric segment is a
/// list, replacing missing or non-list containers with an empty list.
pub fn vivify_lists(root: &mut Node, path: &[Segment], max_gap: usize) -> Result<()> {
    for (i, segment) in path.iter().enumerate() {
        if !segment.is_index() {
            continue;
        }
        let prefix = &path[..i];
        if !matches!(get_in(root, prefix), Some(Node::List(_))) {
            set_in(root, prefix, Node::empty_list(), max_gap)?;
        }
    }
    Ok(())
}

/// Dry run of [`write_in`]: the error it would hit, without touching `root`.
///
/// Numeric segments turn their container into a list, so they never fail on
/// the container type; keyed segments need a map or nothing at all.
pub fn check_write(root: &Node, path: &[Segment], max_gap: usize) -> Result<()> {
    let mut current = Some(root);
    for (depth, segment) in path.iter().enumerate() {
        current = match (current, segment) {
            (Some(Node::List(list)), Segment::Index(idx)) => {
                check_gap(list.len(), *idx, max_gap, &path[..depth])?;
                list.get(*idx).and_then(Option::as_ref)
            }
            (_, Segment::Index(idx)) => {
                check_gap(0, *idx, max_gap, &path[..depth])?;
                None
            }
            (Some(Node::Map(map)), Segment::Key(key)) => map.get(key),
            (None, Segment::Key(_)) => None,
            (Some(_), Segment::Key(_)) => {
                return Err(ShredderError::NotAContainer {
                    path: format_path(&path[..depth]),
                })
            }
        };
    }
    Ok(())
}

/// Vivify lists along `path` and write `value` there.
///
/// Either the whole write happens or `root` is left as it was.
pub fn write_in(root: &mut Node, path: &[Segment], value: Node, max_gap: usize) -> Result<()> {
    check_write(root, path, max_gap)?;
    vivify_lists(root, path, max_gap)?;
    set_in(root, path, value, max_gap)
}

/// Mutable slots of the list at `path`, created empty when nothing is there.
///
/// Only the containers along `path` that are shared with another snapshot get
/// copied; a list the caller already owns is edited where it is.
pub fn list_mut<'a>(root: &'a mut Node, path: &[Segment], max_gap: usize) -> Result<&'a mut ListSlots> {
    let not_a_list = || ShredderError::NotAList {
        path: format_path(path),
    };
    match get_in(root, path) {
        Some(Node::List(_)) => {}
        Some(_) => return Err(not_a_list()),
        None => write_in(root, path, Node::empty_list(), max_gap)?,
    }
    let mut current = root;
    for segment in path {
        current = child_mut(current, segment).ok_or_else(not_a_list)?;
    }
    match current {
        Node::List(list) => Ok(Arc::make_mut(list)),
        _ => Err(not_a_list()),
    }
}

/// Remove the node at `path`. Returns whether anything was removed.
///
/// List removals splice the slot out, shifting later elements down.
pub fn delete_in(root: &mut Node, path: &[Segment]) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    if get_in(root, path).is_none() {
        return false;
    }

    let mut current = root;
    for segment in parents {
        match child_mut(current, segment) {
            Some(child) => current = child,
            None => return false,
        }
    }
    match current {
        Node::Map(map) => Arc::make_mut(map).shift_remove(&index_key(last)).is_some(),
        Node::List(list) => match last.as_index() {
            Some(idx) if idx < list.len() => {
                Arc::make_mut(list).remove(idx);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Merge `value` into `target`.
///
/// Map into map overlays members (recursively with `deep`), list into list
/// concatenates, anything else is replaced by `value`.
pub fn merge_nodes(target: Node, value: Node, deep: bool) -> Node {
    match (target, value) {
        (Node::Map(mut into), Node::Map(from)) => {
            if Arc::ptr_eq(&into, &from) {
                return Node::Map(into);
            }
            let entries = Arc::make_mut(&mut into);
            for (key, val) in from.iter() {
                if deep {
                    if let Some(existing) = entries.get_mut(key) {
                        let current = std::mem::replace(existing, Node::Null);
                        *existing = merge_nodes(current, val.clone(), true);
                        continue;
                    }
                }
                entries.insert(key.clone(), val.clone());
            }
            Node::Map(into)
        }
        (Node::List(mut into), Node::List(from)) => {
            Arc::make_mut(&mut into).extend(from.iter().cloned());
            Node::List(into)
        }
        (_, value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shredder_path::parse_path;

    const GAP: usize = 1 << 16;

    fn node(v: serde_json::Value) -> Node {
        Node::from(v)
    }

    #[test]
    fn test_get_in() {
        let root = node(json!({"a": {"b": [10, {"c": 1}]}}));
        assert_eq!(get_in(&root, &parse_path("a.b[1].c")), Some(&node(json!(1))));
        assert_eq!(get_in(&root, &parse_path("a.b.0")), Some(&node(json!(10))));
        assert_eq!(get_in(&root, &parse_path("a.b[5]")), None);
        assert_eq!(get_in(&root, &parse_path("a.b.x")), None);
        assert_eq!(get_in(&root, &parse_path("a.b[0].deeper")), None);
        assert_eq!(get_in(&root, &[]), Some(&root));
    }

    #[test]
    fn test_get_in_index_on_map() {
        let root = node(json!({"0": "zero"}));
        assert_eq!(get_in(&root, &parse_path("0")), Some(&node(json!("zero"))));
    }

    #[test]
    fn test_set_in_creates_maps() {
        let mut root = Node::empty_map();
        set_in(&mut root, &parse_path("a.b.c"), node(json!(1)), GAP).unwrap();
        assert_eq!(root.to_json(), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_set_in_pads_list() {
        let mut root = node(json!({"l": []}));
        set_in(&mut root, &parse_path("l[2]"), node(json!("x")), GAP).unwrap();
        let list = root.get_key("l").unwrap().as_list().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list[0].is_none() && list[1].is_none());
    }

    #[test]
    fn test_set_in_through_scalar() {
        let mut root = node(json!({"a": 1}));
        let err = set_in(&mut root, &parse_path("a.b"), node(json!(2)), GAP).unwrap_err();
        assert_eq!(err, ShredderError::NotAContainer { path: "a".into() });
    }

    #[test]
    fn test_set_in_key_on_list() {
        let mut root = node(json!({"l": [1]}));
        assert!(set_in(&mut root, &parse_path("l.name"), node(json!(2)), GAP).is_err());
    }

    #[test]
    fn test_set_in_copies_on_write() {
        let before = node(json!({"keep": {"x": 1}, "edit": {"y": 1}}));
        let mut after = before.clone();
        set_in(&mut after, &parse_path("edit.y"), node(json!(2)), GAP).unwrap();

        assert_eq!(before.to_json(), json!({"keep": {"x": 1}, "edit": {"y": 1}}));
        assert!(before.get_key("keep").unwrap().ptr_eq(after.get_key("keep").unwrap()));
        assert!(!before.get_key("edit").unwrap().ptr_eq(after.get_key("edit").unwrap()));
    }

    #[test]
    fn test_vivify_lists_replaces_maps() {
        let mut root = node(json!({"a": {"not": "a list"}}));
        vivify_lists(&mut root, &parse_path("a[0]"), GAP).unwrap();
        assert_eq!(root.to_json(), json!({"a": []}));
    }

    #[test]
    fn test_vivify_lists_keeps_existing() {
        let mut root = node(json!({"a": [1, 2]}));
        let before = root.clone();
        vivify_lists(&mut root, &parse_path("a[5]"), GAP).unwrap();
        assert!(root.ptr_eq(&before));
    }

    #[test]
    fn test_set_in_refuses_far_index() {
        let mut root = node(json!({"l": [1]}));
        let err = set_in(&mut root, &parse_path("l[18446744073709551615]"), node(json!(2)), GAP).unwrap_err();
        assert_eq!(
            err,
            ShredderError::IndexOutOfRange {
                path: "l".into(),
                index: usize::MAX
            }
        );
        // a gap of exactly `max_gap` is still padded
        set_in(&mut root, &parse_path("l[4]"), node(json!(2)), 3).unwrap();
        assert_eq!(root.get_key("l").unwrap().len(), 5);
        assert!(set_in(&mut root, &parse_path("l[9]"), node(json!(2)), 3).is_err());
    }

    #[test]
    fn test_write_in_is_all_or_nothing() {
        let mut root = node(json!({"s": 1, "m": {"k": 1}}));
        let before = root.clone();
        assert_eq!(
            write_in(&mut root, &parse_path("m.k.x[0]"), node(json!(1)), GAP).unwrap_err(),
            ShredderError::NotAContainer { path: "m.k".into() }
        );
        assert_eq!(
            write_in(&mut root, &parse_path("a[0].b[4000000000]"), node(json!(1)), GAP).unwrap_err(),
            ShredderError::IndexOutOfRange {
                path: "a[0].b".into(),
                index: 4_000_000_000
            }
        );
        assert!(root.ptr_eq(&before));
    }

    #[test]
    fn test_check_write_matches_write_in() {
        let root = node(json!({"l": [1, {"k": 1}], "s": "x"}));
        for raw in ["l[1].k", "l[1].k.x", "l.name", "s[0]", "s.x", "n.m[3]", "l[0].x", "l.1.k"] {
            let path = parse_path(raw);
            let mut written = root.clone();
            assert_eq!(
                check_write(&root, &path, GAP).is_ok(),
                write_in(&mut written, &path, node(json!(0)), GAP).is_ok(),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_list_mut_creates_and_edits_in_place() {
        let mut root = node(json!({"a": {}}));
        list_mut(&mut root, &parse_path("a.l"), GAP).unwrap().push(Some(node(json!(1))));
        let first = root.get_key("a").unwrap().get_key("l").unwrap().as_list().unwrap() as *const ListSlots;
        list_mut(&mut root, &parse_path("a.l"), GAP).unwrap().push(Some(node(json!(2))));
        let second = root.get_key("a").unwrap().get_key("l").unwrap().as_list().unwrap() as *const ListSlots;
        assert_eq!(first, second);
        assert_eq!(root.to_json(), json!({"a": {"l": [1, 2]}}));
        assert_eq!(
            list_mut(&mut root, &parse_path("a"), GAP).unwrap_err(),
            ShredderError::NotAList { path: "a".into() }
        );
    }

    #[test]
    fn test_list_mut_copies_shared_list() {
        let mut root = node(json!({"l": [1]}));
        let snapshot = root.clone();
        list_mut(&mut root, &parse_path("l"), GAP).unwrap().push(None);
        assert_eq!(snapshot.to_json(), json!({"l": [1]}));
        assert_eq!(root.get_key("l").unwrap().len(), 2);
    }

    #[test]
    fn test_delete_in() {
        let mut root = node(json!({"a": {"b": 1, "c": 2}, "l": [1, 2, 3]}));
        assert!(delete_in(&mut root, &parse_path("a.b")));
        assert!(delete_in(&mut root, &parse_path("l[0]")));
        assert_eq!(root.to_json(), json!({"a": {"c": 2}, "l": [2, 3]}));
    }

    #[test]
    fn test_delete_in_absent_is_noop() {
        let mut root = node(json!({"a": 1}));
        let before = root.clone();
        assert!(!delete_in(&mut root, &parse_path("zz.y")));
        assert!(!delete_in(&mut root, &[]));
        assert!(root.ptr_eq(&before));
    }

    #[test]
    fn test_merge_shallow() {
        let merged = merge_nodes(
            node(json!({"a": {"x": 1}, "b": 1})),
            node(json!({"a": {"y": 2}, "c": 3})),
            false,
        );
        assert_eq!(merged.to_json(), json!({"a": {"y": 2}, "b": 1, "c": 3}));
    }

    #[test]
    fn test_merge_deep() {
        let merged = merge_nodes(
            node(json!({"a": {"x": 1, "l": [1]}, "b": 1})),
            node(json!({"a": {"y": 2, "l": [2]}})),
            true,
        );
        assert_eq!(merged.to_json(), json!({"a": {"x": 1, "y": 2, "l": [1, 2]}, "b": 1}));
    }

    #[test]
    fn test_merge_mismatch_replaces() {
        assert_eq!(merge_nodes(node(json!([1])), node(json!({"a": 1})), false), node(json!({"a": 1})));
        assert_eq!(merge_nodes(node(json!({"a": 1})), node(json!(5)), true), node(json!(5)));
    }
}
