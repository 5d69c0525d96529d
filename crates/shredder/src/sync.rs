//! Patch-based state synchronization.
//!
//! The producer diffs its state and ships [`Envelope`]s; the consumer replays
//! them against the snapshot the producer diffed from (`previous`) and the
//! snapshot it currently shows (`current`).

use std::sync::Arc;

use serde_json::Value;
use shredder_patch::Op;

use crate::codec::{JsonPatchCodec, PatchCodec};
use crate::envelope::{BranchPatch, Envelope};
use crate::error::{Result, ShredderError};
use crate::node::Node;
use crate::shredder::Shredder;

#[derive(Debug, Clone, Default)]
pub struct PatchSynchronizer<C = JsonPatchCodec> {
    codec: C,
}

impl<C: PatchCodec> PatchSynchronizer<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn patch_error(&self, branch: Option<&str>, patch: &C::Patch, err: C::Error) -> ShredderError {
        ShredderError::PatchApply {
            branch: branch.map(str::to_string),
            patch: self.codec.encode(patch),
            reason: err.to_string(),
        }
    }

    /// Compute the next snapshot from one envelope.
    ///
    /// Either every branch applies or an error is returned; the inputs are
    /// never modified.
    pub fn apply(&self, current: &Node, previous: &Node, envelope: &Envelope<C::Patch>) -> Result<Node> {
        match envelope {
            Envelope::FullState(patch) => {
                tracing::debug!("applying legacy full-state patch");
                let next = self
                    .codec
                    .apply(previous, patch)
                    .map_err(|e| self.patch_error(None, patch, e))?;
                if !next.is_container() {
                    return Err(ShredderError::PatchApply {
                        branch: None,
                        patch: self.codec.encode(patch),
                        reason: format!("root cannot be set with {next}"),
                    });
                }
                Ok(next)
            }
            Envelope::PerBranch(branches) => {
                tracing::debug!(branches = branches.len(), "applying per-branch patches");
                let Node::Map(mut next) = current.clone() else {
                    return Err(ShredderError::PatchApply {
                        branch: None,
                        patch: Value::Null,
                        reason: "current state is not a map".into(),
                    });
                };
                for (branch, entry) in branches {
                    match entry {
                        BranchPatch::Delete => {
                            tracing::debug!(branch = %branch, "deleting branch");
                            Arc::make_mut(&mut next).shift_remove(branch);
                        }
                        BranchPatch::Patch(patch) => {
                            let base = previous.get_key(branch).cloned().unwrap_or_else(Node::empty_map);
                            let patched = self
                                .codec
                                .apply(&base, patch)
                                .map_err(|e| self.patch_error(Some(branch), patch, e))?;
                            Arc::make_mut(&mut next).insert(branch.clone(), patched);
                        }
                    }
                }
                Ok(Node::Map(next))
            }
        }
    }

    /// Legacy envelope turning `prev` into `next`.
    pub fn diff_full(&self, prev: &Node, next: &Node) -> Envelope<C::Patch> {
        Envelope::FullState(self.codec.diff(prev, next))
    }

    /// Per-branch envelope turning `prev` into `next`.
    ///
    /// Branches equal on both sides are left out; branches missing from
    /// `next` are deleted.
    pub fn diff_branches(&self, prev: &Node, next: &Node) -> Envelope<C::Patch> {
        let empty = Node::empty_map();
        let mut branches = Vec::new();
        if let Some(next_map) = next.as_map() {
            for (branch, val) in next_map {
                let base = prev.get_key(branch);
                if base == Some(val) {
                    continue;
                }
                let patch = self.codec.diff(base.unwrap_or(&empty), val);
                branches.push((branch.clone(), BranchPatch::Patch(patch)));
            }
        }
        if let Some(prev_map) = prev.as_map() {
            for branch in prev_map.keys() {
                if next.get_key(branch).is_none() {
                    branches.push((branch.clone(), BranchPatch::Delete));
                }
            }
        }
        Envelope::PerBranch(branches)
    }
}

/// Consumer-side `(current, previous)` pair advanced by each envelope.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use shredder::{Shredder, SyncState};
///
/// let mut sync = SyncState::new(Shredder::from_json(json!({"x": 1})).unwrap());
/// sync.receive_json(&json!({"state": [{"op": "replace", "path": "/x", "value": 2}]})).unwrap();
/// assert_eq!(sync.current().to_json(), json!({"x": 2}));
/// ```
#[derive(Debug, Clone)]
pub struct SyncState {
    current: Shredder,
    previous: Shredder,
    synchronizer: PatchSynchronizer,
}

impl SyncState {
    pub fn new(initial: Shredder) -> Self {
        Self {
            previous: initial.clone(),
            current: initial,
            synchronizer: PatchSynchronizer::default(),
        }
    }

    pub fn current(&self) -> &Shredder {
        &self.current
    }

    pub fn previous(&self) -> &Shredder {
        &self.previous
    }

    /// Replace the displayed snapshot, e.g. after a local edit.
    ///
    /// `previous` keeps tracking the producer's diff base.
    pub fn set_current(&mut self, current: Shredder) {
        self.current = current;
    }

    pub fn synchronizer(&self) -> &PatchSynchronizer {
        &self.synchronizer
    }

    /// Apply one envelope; on error both snapshots stay as they were.
    pub fn receive(&mut self, envelope: &Envelope<Vec<Op>>) -> Result<&Shredder> {
        let next = self
            .synchronizer
            .apply(self.current.state(), self.previous.state(), envelope)?;
        let next = self.current.derive(next);
        self.previous = next.clone();
        self.current = next;
        Ok(&self.current)
    }

    pub fn receive_json(&mut self, raw: &Value) -> Result<&Shredder> {
        let envelope = Envelope::from_json(self.synchronizer.codec(), raw)?;
        self.receive(&envelope)
    }
}
