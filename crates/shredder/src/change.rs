//! Change events emitted by a live result-set producer.
//!
//! Wire shape: `{type, old_offset?, new_offset?, old_val?, new_val?}`. Offsets
//! are positions in the producer's ordered result; unordered feeds omit them
//! (or send `null`) and rely on the `id` member of `old_val`.

use serde_json::{Map, Value};

use crate::error::{Result, ShredderError};
use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Remove,
    Change,
    Initial,
    Uninitial,
    State,
    /// Any other tag; kept so the reconciler can reject it with the payload.
    Other(String),
}

impl ChangeKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "add" => ChangeKind::Add,
            "remove" => ChangeKind::Remove,
            "change" => ChangeKind::Change,
            "initial" => ChangeKind::Initial,
            "uninitial" => ChangeKind::Uninitial,
            "state" => ChangeKind::State,
            other => ChangeKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
            ChangeKind::Change => "change",
            ChangeKind::Initial => "initial",
            ChangeKind::Uninitial => "uninitial",
            ChangeKind::State => "state",
            ChangeKind::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub kind: ChangeKind,
    pub old_offset: Option<usize>,
    pub new_offset: Option<usize>,
    pub old_val: Option<Node>,
    pub new_val: Option<Node>,
}

impl Change {
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            old_offset: None,
            new_offset: None,
            old_val: None,
            new_val: None,
        }
    }

    pub fn with_old_offset(mut self, offset: usize) -> Self {
        self.old_offset = Some(offset);
        self
    }

    pub fn with_new_offset(mut self, offset: usize) -> Self {
        self.new_offset = Some(offset);
        self
    }

    pub fn with_old_val(mut self, val: impl Into<Node>) -> Self {
        self.old_val = Some(val.into());
        self
    }

    pub fn with_new_val(mut self, val: impl Into<Node>) -> Self {
        self.new_val = Some(val.into());
        self
    }

    /// The `id` member of `old_val`, used for identity lookups.
    pub fn old_id(&self) -> Option<&Node> {
        self.old_val.as_ref()?.get_key("id")
    }

    /// Decode a change event.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use shredder::{Change, ChangeKind};
    ///
    /// let change = Change::from_json(&json!({"type": "add", "new_offset": 0, "new_val": {"id": 1}})).unwrap();
    /// assert_eq!(change.kind, ChangeKind::Add);
    /// assert_eq!(change.new_offset, Some(0));
    /// ```
    pub fn from_json(v: &Value) -> Result<Self> {
        let obj = v
            .as_object()
            .ok_or_else(|| ShredderError::payload("change must be an object"))?;
        let tag = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ShredderError::payload("change requires a string 'type'"))?;

        Ok(Self {
            kind: ChangeKind::parse(tag),
            old_offset: decode_offset(obj, "old_offset")?,
            new_offset: decode_offset(obj, "new_offset")?,
            old_val: obj.get("old_val").filter(|v| !v.is_null()).map(Node::from),
            new_val: obj.get("new_val").filter(|v| !v.is_null()).map(Node::from),
        })
    }

    pub fn to_json(&self) -> Value {
        let mut m = Map::new();
        m.insert("type".into(), Value::String(self.kind.as_str().to_string()));
        if let Some(offset) = self.old_offset {
            m.insert("old_offset".into(), offset.into());
        }
        if let Some(offset) = self.new_offset {
            m.insert("new_offset".into(), offset.into());
        }
        if let Some(val) = &self.old_val {
            m.insert("old_val".into(), val.to_json());
        }
        if let Some(val) = &self.new_val {
            m.insert("new_val".into(), val.to_json());
        }
        Value::Object(m)
    }
}

fn decode_offset(obj: &Map<String, Value>, key: &str) -> Result<Option<usize>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ShredderError::payload(format!("'{key}' must be a non-negative integer"))),
    }
}
