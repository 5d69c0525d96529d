mod common;

use common::{json_at, node, tree};
use proptest::prelude::*;
use serde_json::json;
use shredder::{Entry, Node, Segment, Shredder, ShredderConfig, ShredderError};

#[test]
fn set_adds_member_and_keeps_source() {
    let s = tree(json!({"bim": "bam"}));
    let n = s.set("titi", json!({"gros": "minet"})).unwrap();

    assert_eq!(n.to_json(), json!({"bim": "bam", "titi": {"gros": "minet"}}));
    assert_eq!(s.to_json(), json!({"bim": "bam"}));
}

#[test]
fn set_far_past_list_end_is_an_error() {
    let s = tree(json!({"a": [1]}));

    for raw in ["a[18446744073709551615]", "a[4000000000]", "b[4000000000].c"] {
        let err = s.set(raw, 1i64).unwrap_err();
        assert!(matches!(err, ShredderError::IndexOutOfRange { .. }), "{raw}: {err}");
    }
    assert_eq!(
        s.set("a[18446744073709551615]", 1i64).unwrap_err(),
        ShredderError::IndexOutOfRange {
            path: "a".into(),
            index: usize::MAX
        }
    );
    assert_eq!(s.to_json(), json!({"a": [1]}));
}

#[test]
fn index_gap_follows_config() {
    let config = ShredderConfig::from_toml_str("max_index_gap = 2").unwrap();
    let s = Shredder::with_config(json!({"a": [1]}), config);

    assert_eq!(json_at(&s.set("a[3]", 4i64).unwrap(), "a"), json!([1, null, null, 4]));
    assert!(matches!(s.set("a[4]", 5i64), Err(ShredderError::IndexOutOfRange { index: 4, .. })));
    assert!(s.push("l[3]", 1i64).is_err());
}

#[test]
fn set_cool_path_autovivifies_sparse_lists() {
    let s = tree(json!({"bim": "bam"}));
    let n = s
        .set("blim.bla.boom[1].splif[3].splaf", json!({"gros": "minet"}))
        .unwrap();

    assert_eq!(
        n.to_json(),
        json!({
            "bim": "bam",
            "blim": {"bla": {"boom": [null, {"splif": [null, null, null, {"splaf": {"gros": "minet"}}]}]}}
        })
    );
    assert_eq!(s.to_json(), json!({"bim": "bam"}));

    // Skipped indices are absent, not null
    assert!(!n.has("blim.bla.boom[0]").unwrap());
    assert!(!n.has("blim.bla.boom[1].splif[2]").unwrap());
    let boom = n.get("blim.bla.boom").unwrap().unwrap().into_node();
    assert_eq!(boom.as_list().unwrap()[0], None);
}

#[test]
fn set_numeric_segment_replaces_map_with_list() {
    let n = tree(json!({})).set("a.b[2].c", 1i64).unwrap();
    assert_eq!(n.to_json(), json!({"a": {"b": [null, null, {"c": 1}]}}));

    let n = tree(json!({"a": {"b": {"k": "v"}}})).set("a.b.0", "x").unwrap();
    assert_eq!(n.to_json(), json!({"a": {"b": ["x"]}}));
}

#[test]
fn set_through_scalar_fails() {
    let s = tree(json!({"a": 1}));
    assert_eq!(
        s.set("a.b", 2i64).unwrap_err(),
        ShredderError::NotAContainer { path: "a".into() }
    );
    assert_eq!(s.to_json(), json!({"a": 1}));
}

#[test]
fn root_writes() {
    let s = tree(json!({"x": 1}));
    assert_eq!(s.set("", 3i64).unwrap_err(), ShredderError::RootType { value: json!(3) });
    assert_eq!(s.set("", "str").unwrap_err(), ShredderError::RootType { value: json!("str") });
    assert_eq!(s.set("", json!({"y": 2})).unwrap().to_json(), json!({"y": 2}));
    assert_eq!(s.set("", json!([1, 2])).unwrap().to_json(), json!([1, 2]));
}

#[test]
fn reserved_paths_are_rejected() {
    let s = tree(json!({}));
    for path in ["set", "get.a", "set[0]"] {
        assert!(matches!(s.set(path, 1i64), Err(ShredderError::ReservedPath { .. })));
        assert!(matches!(s.get(path), Err(ShredderError::ReservedPath { .. })));
        assert!(matches!(s.del(path), Err(ShredderError::ReservedPath { .. })));
    }
    assert!(s.set("settings", 1i64).is_ok());
}

#[test]
fn segment_paths_bypass_the_resolver() {
    let s = tree(json!({}));
    let path = vec![Segment::key("a.b"), Segment::Index(0)];
    let n = s.set(&path, true).unwrap();
    assert_eq!(n.to_json(), json!({"a.b": [true]}));
    assert!(s.resolver().is_empty());
    assert!(matches!(n.get(path.as_slice()).unwrap(), Some(Entry::Value(Node::Bool(true)))));
}

#[test]
fn del_removes_member() {
    let n = tree(json!({"bim": "bam"})).del("bim").unwrap();
    assert_eq!(n.to_json(), json!({}));
}

#[test]
fn del_splices_list_and_ignores_missing() {
    let s = tree(json!({"l": [1, 2, 3]}));
    assert_eq!(s.del("l[1]").unwrap().to_json(), json!({"l": [1, 3]}));
    assert_eq!(s.del("l[9]").unwrap(), s);
    assert_eq!(s.del("zz.top").unwrap(), s);
}

#[test]
fn untouched_branches_are_shared() {
    let s = tree(json!({"keep": {"big": [1, 2, 3]}, "edit": {"v": 1}}));
    let n = s.set("edit.v", 2i64).unwrap();
    let keep_before = s.get("keep").unwrap().unwrap().into_node();
    let keep_after = n.get("keep").unwrap().unwrap().into_node();
    assert!(keep_before.ptr_eq(&keep_after));
}

#[test]
fn get_reads_index_as_map_key() {
    let s = tree(json!({"m": {"0": "zero"}, "l": ["a"]}));
    assert_eq!(json_at(&s, "m.0"), json!("zero"));
    assert_eq!(json_at(&s, "l[0]"), json!("a"));
    assert_eq!(json_at(&s, "l.0"), json!("a"));
    assert_eq!(s.get("l[4]").unwrap(), None);
}

#[test]
fn merge_shallow_and_deep() {
    let s = tree(json!({"cfg": {"a": {"x": 1}, "b": 1}}));

    let shallow = s.merge("cfg", json!({"a": {"y": 2}})).unwrap();
    assert_eq!(json_at(&shallow, "cfg"), json!({"a": {"y": 2}, "b": 1}));

    let deep = s.merge_deep("cfg", json!({"a": {"y": 2}})).unwrap();
    assert_eq!(json_at(&deep, "cfg"), json!({"a": {"x": 1, "y": 2}, "b": 1}));

    let fresh = s.merge("new.spot", json!({"k": true})).unwrap();
    assert_eq!(json_at(&fresh, "new.spot"), json!({"k": true}));

    assert!(matches!(s.merge("", 5i64), Err(ShredderError::RootType { .. })));
}

#[test]
fn list_helpers() {
    let s = tree(json!({"l": [1, 2]}));

    assert_eq!(json_at(&s.push("l", 3i64).unwrap(), "l"), json!([1, 2, 3]));
    assert_eq!(json_at(&s.push("fresh", 3i64).unwrap(), "fresh"), json!([3]));
    assert_eq!(json_at(&s.push_at("l", 0i64, 0).unwrap(), "l"), json!([0, 1, 2]));
    assert_eq!(json_at(&s.push_at("l", 9i64, 99).unwrap(), "l"), json!([1, 2, 9]));
    assert_eq!(json_at(&s.pop("l").unwrap(), "l"), json!([1]));
    assert_eq!(json_at(&s.pop("missing").unwrap(), "missing"), json!([]));
    assert_eq!(json_at(&s.concat("l", json!([3, 4])).unwrap(), "l"), json!([1, 2, 3, 4]));
    assert_eq!(json_at(&s.concat("l", 3i64).unwrap(), "l"), json!([1, 2, 3]));
    assert_eq!(json_at(&s.clear("l").unwrap(), "l"), json!([]));
    assert_eq!(s.clear("missing").unwrap(), s);
}

#[test]
fn unpush_removes_first_structural_match() {
    let s = tree(json!({"l": [{"id": 1}, {"id": 2}, {"id": 1}]}));
    let n = s.unpush("l", json!({"id": 1})).unwrap();
    assert_eq!(json_at(&n, "l"), json!([{"id": 2}, {"id": 1}]));

    assert_eq!(s.unpush("l", json!({"id": 7})).unwrap(), s);
    assert_eq!(s.unpush("missing", 1i64).unwrap(), s);
}

#[test]
fn move_before_relocates() {
    let s = tree(json!({"l": ["a", "b", "c"]}));
    assert_eq!(json_at(&s.move_before("l", "c", "a").unwrap(), "l"), json!(["c", "a", "b"]));
    assert_eq!(json_at(&s.move_before("l", "a", "c").unwrap(), "l"), json!(["b", "a", "c"]));
    assert_eq!(json_at(&s.move_before("l", "a", "nope").unwrap(), "l"), json!(["b", "c", "a"]));
    assert_eq!(s.move_before("l", "nope", "a").unwrap(), s);
}

#[test]
fn root_list_push() {
    let mut l = Shredder::new(json!([]));
    for i in 0..100i64 {
        l = l.push("", i).unwrap();
    }
    assert_eq!(l.len(), 100);
    assert_eq!(l.get(vec![Segment::Index(99)]).unwrap().unwrap().to_json(), json!(99));
}

#[test]
fn list_helpers_reject_non_lists() {
    let s = tree(json!({"m": {"a": 1}}));
    assert_eq!(s.push("m", 1i64).unwrap_err(), ShredderError::NotAList { path: "m".into() });
    assert!(matches!(s.concat("m", 1i64), Err(ShredderError::NotAList { .. })));
    assert!(matches!(s.unpush("m", 1i64), Err(ShredderError::NotAList { .. })));
}

#[test]
fn equality_is_structural() {
    let a = tree(json!({"x": 1, "y": [1, 2]}));
    let b = tree(json!({"y": [1, 2], "x": 1}));
    assert_eq!(a, b);
    assert_eq!(a, node(json!({"x": 1, "y": [1, 2]})));
    assert_ne!(a, a.set("x", 2i64).unwrap());
}

fn arb_segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        "[a-z]{1,6}".prop_filter("reserved", |k| k != "set" && k != "get").prop_map(Segment::Key),
        (0usize..6).prop_map(Segment::Index),
    ]
}

proptest! {
    #[test]
    fn set_then_get_returns_value(
        path in prop::collection::vec(arb_segment(), 1..6),
        value in any::<i64>(),
        base in prop_oneof![Just(json!({})), Just(json!({"A": {"B": [1, 2]}, "C": 3}))],
    ) {
        let source = tree(base.clone());
        let next = source.set(&path, value).unwrap();
        let read = next.get(&path).unwrap().map(|e| e.into_node());
        prop_assert_eq!(read, Some(Node::from(value)));
        prop_assert_eq!(source.to_json(), base);
    }
}
