//! Persistent tree values.
//!
//! A [`Node`] is an immutable JSON-like value whose containers sit behind
//! `Arc`s. Cloning a node is cheap and two snapshots that differ in one
//! sub-region share every other sub-tree. Writers go through
//! `Arc::make_mut`, which copies a container only when it is shared.
//!
//! Lists hold `Option<Node>` slots: `None` is an absent placeholder (left
//! behind by sparse writes), which is different from an explicit `Null`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// List storage: `None` marks an absent slot.
pub type ListSlots = Vec<Option<Node>>;

/// Map storage. Equality ignores insertion order.
pub type MapEntries = IndexMap<String, Node>;

#[derive(Debug, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Arc<ListSlots>),
    Map(Arc<MapEntries>),
}

impl Node {
    pub fn empty_map() -> Self {
        Node::Map(Arc::new(IndexMap::new()))
    }

    pub fn empty_list() -> Self {
        Node::List(Arc::new(Vec::new()))
    }

    /// Build a list without absent slots.
    pub fn list(items: impl IntoIterator<Item = Node>) -> Self {
        Node::List(Arc::new(items.into_iter().map(Some).collect()))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::List(_) | Node::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    pub fn as_list(&self) -> Option<&ListSlots> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapEntries> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Member lookup on a map node.
    pub fn get_key(&self, key: &str) -> Option<&Node> {
        self.as_map()?.get(key)
    }

    /// Slot lookup on a list node; absent slots read as `None`.
    pub fn get_index(&self, index: usize) -> Option<&Node> {
        self.as_list()?.get(index)?.as_ref()
    }

    /// Number of entries of a container, `0` for scalars.
    pub fn len(&self) -> usize {
        match self {
            Node::List(list) => list.len(),
            Node::Map(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when both nodes are the very same shared container.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::List(a), Node::List(b)) => Arc::ptr_eq(a, b),
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }

    /// Convert into a plain JSON value. Absent list slots become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::List(list) => Value::Array(
                list.iter()
                    .map(|slot| slot.as_ref().map_or(Value::Null, Node::to_json))
                    .collect(),
            ),
            Node::Map(map) => {
                let mut obj = Map::new();
                for (key, val) in map.iter() {
                    obj.insert(key.clone(), val.to_json());
                }
                Value::Object(obj)
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::List(a), Node::List(b)) => Arc::ptr_eq(a, b) || a == b,
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl Eq for Node {}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#}", self.to_json())
        } else {
            write!(f, "{}", self.to_json())
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(arr) => Node::List(Arc::new(
                arr.iter().map(|v| Some(Node::from(v))).collect(),
            )),
            Value::Object(obj) => Node::Map(Arc::new(
                obj.iter().map(|(k, v)| (k.clone(), Node::from(v))).collect(),
            )),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from(&value)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Node::Number(n.into())
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_roundtrip() {
        let value = json!({"a": [1, {"b": null}], "c": "x", "d": true});
        assert_eq!(Node::from(&value).to_json(), value);
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = Node::from(json!({"x": 1, "y": 2}));
        let b = Node::from(json!({"y": 2, "x": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_list_equality_is_ordered() {
        assert_ne!(Node::from(json!([1, 2])), Node::from(json!([2, 1])));
    }

    #[test]
    fn test_absent_slot_differs_from_null() {
        let holes = Node::List(Arc::new(vec![None, Some(Node::Null)]));
        let nulls = Node::from(json!([null, null]));
        assert_ne!(holes, nulls);
        assert_eq!(holes.get_index(0), None);
        assert_eq!(holes.get_index(1), Some(&Node::Null));
        assert_eq!(holes.to_json(), json!([null, null]));
    }

    #[test]
    fn test_clone_shares_containers() {
        let a = Node::from(json!({"big": [1, 2, 3]}));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(a.get_key("big").unwrap().ptr_eq(b.get_key("big").unwrap()));
    }

    #[test]
    fn test_accessors() {
        let node = Node::from(json!({"id": 7, "name": "n", "tags": []}));
        assert_eq!(node.get_key("id").and_then(Node::as_i64), Some(7));
        assert_eq!(node.get_key("name").and_then(Node::as_str), Some("n"));
        assert!(node.get_key("tags").unwrap().is_list());
        assert_eq!(node.len(), 3);
        assert_eq!(Node::from(5i64).len(), 0);
        assert_eq!(node.kind(), "map");
    }

    #[test]
    fn test_display() {
        let node = Node::from(json!({"a": 1}));
        assert_eq!(node.to_string(), "{\"a\":1}");
        assert!(format!("{node:#}").contains('\n'));
    }
}
