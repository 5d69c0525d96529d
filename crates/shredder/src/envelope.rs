//! Sync envelopes.
//!
//! Two wire protocols are accepted:
//!
//! - current: `{"patches": {"<branch>": <patch> | false, ...}}`, one patch per
//!   top-level branch, `false` deleting the branch;
//! - legacy: `{"state": <patch>}`, one patch for the whole snapshot.
//!
//! The protocol is decided once, at decode time.

use serde_json::{Map, Value};

use crate::codec::PatchCodec;
use crate::error::{Result, ShredderError};

#[derive(Debug, Clone, PartialEq)]
pub enum BranchPatch<P> {
    Patch(P),
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<P> {
    /// Legacy protocol: one patch against the previous full snapshot.
    FullState(P),
    /// Branch patches in wire order.
    PerBranch(Vec<(String, BranchPatch<P>)>),
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl<P> Envelope<P> {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Envelope::FullState(_))
    }

    /// Decode an envelope, decoding each patch with `codec`.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use shredder::{BranchPatch, Envelope, JsonPatchCodec};
    ///
    /// let raw = json!({"patches": {"a": [{"op": "add", "path": "/x", "value": 1}], "b": false}});
    /// let Envelope::PerBranch(branches) = Envelope::from_json(&JsonPatchCodec, &raw).unwrap() else {
    ///     panic!("expected per-branch envelope");
    /// };
    /// assert_eq!(branches[0].0, "a");
    /// assert_eq!(branches[1], ("b".to_string(), BranchPatch::Delete));
    /// ```
    pub fn from_json<C>(codec: &C, raw: &Value) -> Result<Self>
    where
        C: PatchCodec<Patch = P>,
    {
        let obj = raw
            .as_object()
            .ok_or_else(|| ShredderError::payload("envelope must be an object"))?;

        match obj.get("patches").filter(|v| is_truthy(v)) {
            Some(patches) => {
                let patches = patches
                    .as_object()
                    .ok_or_else(|| ShredderError::payload("'patches' must be an object"))?;
                let mut branches = Vec::with_capacity(patches.len());
                for (branch, raw_patch) in patches {
                    let entry = if *raw_patch == Value::Bool(false) {
                        BranchPatch::Delete
                    } else {
                        BranchPatch::Patch(codec.decode(raw_patch).map_err(|e| {
                            ShredderError::payload(format!("branch '{branch}': {e}"))
                        })?)
                    };
                    branches.push((branch.clone(), entry));
                }
                Ok(Envelope::PerBranch(branches))
            }
            None => {
                let state = obj
                    .get("state")
                    .ok_or_else(|| ShredderError::payload("envelope has neither 'patches' nor 'state'"))?;
                let patch = codec
                    .decode(state)
                    .map_err(|e| ShredderError::payload(format!("state: {e}")))?;
                Ok(Envelope::FullState(patch))
            }
        }
    }

    pub fn to_json<C>(&self, codec: &C) -> Value
    where
        C: PatchCodec<Patch = P>,
    {
        let mut out = Map::new();
        match self {
            Envelope::FullState(patch) => {
                out.insert("state".into(), codec.encode(patch));
            }
            Envelope::PerBranch(branches) => {
                let mut patches = Map::new();
                for (branch, entry) in branches {
                    let raw = match entry {
                        BranchPatch::Patch(patch) => codec.encode(patch),
                        BranchPatch::Delete => Value::Bool(false),
                    };
                    patches.insert(branch.clone(), raw);
                }
                out.insert("patches".into(), Value::Object(patches));
            }
        }
        Value::Object(out)
    }
}
