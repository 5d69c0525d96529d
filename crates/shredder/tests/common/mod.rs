#![allow(dead_code)]

use serde_json::Value;
use shredder::{Change, Envelope, JsonPatchCodec, Node, Shredder};
use shredder_patch::Op;

pub fn tree(v: Value) -> Shredder {
    Shredder::new(v)
}

pub fn node(v: Value) -> Node {
    Node::from(v)
}

pub fn change(v: Value) -> Change {
    Change::from_json(&v).expect("valid change")
}

pub fn envelope(v: Value) -> Envelope<Vec<Op>> {
    Envelope::from_json(&JsonPatchCodec, &v).expect("valid envelope")
}

/// JSON view of the value at `path`, `Value::Null` when absent.
pub fn json_at(tree: &Shredder, path: &str) -> Value {
    tree.get(path)
        .expect("path resolves")
        .map_or(Value::Null, |entry| entry.to_json())
}

/// Route `tracing` output to the test writer; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
