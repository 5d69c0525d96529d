//! Diff codec seam.
//!
//! The synchronizer treats patches as opaque values produced and consumed by a
//! [`PatchCodec`]. [`JsonPatchCodec`] is the default, backed by
//! `shredder-patch` (RFC 6902 JSON Patch).

use std::fmt::{Debug, Display};

use serde_json::Value;
use shredder_patch::{Op, PatchError};

use crate::node::Node;

pub trait PatchCodec {
    type Patch: Clone + Debug;
    type Error: Display;

    /// Patch turning `from` into `to`.
    fn diff(&self, from: &Node, to: &Node) -> Self::Patch;

    /// Replay `patch` onto `base`, producing a new node.
    fn apply(&self, base: &Node, patch: &Self::Patch) -> Result<Node, Self::Error>;

    fn decode(&self, raw: &Value) -> Result<Self::Patch, Self::Error>;

    fn encode(&self, patch: &Self::Patch) -> Value;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPatchCodec;

impl PatchCodec for JsonPatchCodec {
    type Patch = Vec<Op>;
    type Error = PatchError;

    fn diff(&self, from: &Node, to: &Node) -> Vec<Op> {
        shredder_patch::diff(&from.to_json(), &to.to_json())
    }

    fn apply(&self, base: &Node, patch: &Vec<Op>) -> Result<Node, PatchError> {
        shredder_patch::apply_patch(base.to_json(), patch).map(Node::from)
    }

    fn decode(&self, raw: &Value) -> Result<Vec<Op>, PatchError> {
        shredder_patch::from_json_patch(raw)
    }

    fn encode(&self, patch: &Vec<Op>) -> Value {
        shredder_patch::to_json_patch(patch)
    }
}
