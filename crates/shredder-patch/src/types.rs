//! Core types for the patch codec.

use serde_json::Value;
use thiserror::Error;

/// JSON Pointer components addressing a location inside a document.
pub type PointerPath = Vec<String>;

/// A complete patch: operations applied in order.
pub type Patch = Vec<Op>;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("TEST")]
    Test,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("INVALID_TARGET")]
    InvalidTarget,
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A JSON Patch (RFC 6902) operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add {
        path: PointerPath,
        value: Value,
    },
    Remove {
        path: PointerPath,
        old_value: Option<Value>,
    },
    Replace {
        path: PointerPath,
        value: Value,
        old_value: Option<Value>,
    },
    Copy {
        path: PointerPath,
        from: PointerPath,
    },
    Move {
        path: PointerPath,
        from: PointerPath,
    },
    Test {
        path: PointerPath,
        value: Value,
        not: bool,
    },
}

impl Op {
    /// Returns the wire name of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Copy { .. } => "copy",
            Op::Move { .. } => "move",
            Op::Test { .. } => "test",
        }
    }

    /// Returns the target path of the operation.
    pub fn path(&self) -> &PointerPath {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path, .. }
            | Op::Replace { path, .. }
            | Op::Copy { path, .. }
            | Op::Move { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Op::Test { .. })
    }
}
