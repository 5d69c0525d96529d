//! Error type shared by every shredder operation.
//!
//! Errors are raised before or during the offending operation and never leave
//! a partially written snapshot behind. Each variant carries the offending
//! payload for diagnostics; retrying or resynchronizing is up to the caller.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShredderError {
    /// The first path segment collides with a tool name (`set`/`get`).
    #[error("path '{path}' starts with a reserved tool name")]
    ReservedPath { path: String },

    /// The root was set to a non-container value.
    #[error("root cannot be set with {value}")]
    RootType { value: Value },

    /// An identity or offset lookup failed while reconciling a change.
    #[error("change couldn't be applied: {change}")]
    Reconcile { change: Value },

    #[error("unrecognized 'type' field from server: {change}")]
    UnrecognizedChange { change: Value },

    /// A patch does not fit the value it was applied to.
    #[error("patch couldn't be applied (branch: {branch:?}): {reason}")]
    PatchApply {
        branch: Option<String>,
        patch: Value,
        reason: String,
    },

    /// A write tried to descend through a scalar.
    #[error("value at '{path}' is not a container")]
    NotAContainer { path: String },

    #[error("value at '{path}' is not a list")]
    NotAList { path: String },

    /// A write addressed a list slot too far past its end.
    #[error("index {index} is too far past the end of the list at '{path}'")]
    IndexOutOfRange { path: String, index: usize },

    /// A change or envelope payload does not have the expected shape.
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ShredderError>;

impl ShredderError {
    pub(crate) fn payload(reason: impl Into<String>) -> Self {
        ShredderError::InvalidPayload {
            reason: reason.into(),
        }
    }
}
