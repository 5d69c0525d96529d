//! Structural diff/patch codec for shredder branches.
//!
//! Patches are RFC 6902 JSON Patch documents: `add`, `remove`, `replace`,
//! `copy`, `move` and `test`. [`diff`] produces a patch from two documents,
//! [`apply_patch`] replays one onto a base document, and the [`codec::json`]
//! module moves patches on and off the wire.

pub mod apply;
pub mod codec;
pub mod diff;
pub mod types;

pub use apply::{apply_op, apply_patch};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
pub use diff::diff;
pub use types::{Op, Patch, PatchError, PointerPath};
