use serde_json::{json, Value};
use shredder_patch::{apply_patch, diff, from_json_patch, to_json_patch, PatchError};

fn assert_diff_apply(src: Value, dst: Value) {
    let ops = diff(&src, &dst);
    let wire = to_json_patch(&ops);
    let decoded = from_json_patch(&wire).expect("decode wire patch");
    assert_eq!(decoded, ops);
    let out = apply_patch(src.clone(), &decoded).expect("apply diff");
    assert_eq!(out, dst, "diff from {src} to {dst}");
}

#[test]
fn diff_workflow_matrix() {
    let cases = [
        (json!({}), json!({})),
        (json!({"x": 1}), json!({"x": 2})),
        (json!({"x": 1}), json!({})),
        (json!({"a": {"b": [1, 2, 3]}}), json!({"a": {"b": [3]}})),
        (json!({"a": []}), json!({"a": [{"id": 1}, {"id": 2}]})),
        (json!([1, {"k": "v"}]), json!([1, {"k": "w", "n": null}, 7])),
        (json!("text"), json!({"now": "object"})),
        (json!({"deep": {"er": {"est": true}}}), json!({"deep": {"er": {}}})),
    ];
    for (src, dst) in cases {
        assert_diff_apply(src, dst);
    }
}

#[test]
fn patch_against_wrong_base_fails() {
    let ops = diff(&json!({"list": [1, 2, 3]}), &json!({"list": [1, 2]}));
    let err = apply_patch(json!({"list": []}), &ops).unwrap_err();
    assert_eq!(err, PatchError::NotFound);
}

#[test]
fn patch_through_scalar_fails() {
    let ops = diff(&json!({"a": {"b": 1}}), &json!({"a": {"b": 2}}));
    let err = apply_patch(json!({"a": 5}), &ops).unwrap_err();
    assert_eq!(err, PatchError::InvalidTarget);
}
