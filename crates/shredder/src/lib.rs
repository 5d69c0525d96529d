//! shredder: a persistent, path-addressable state tree kept in sync with a
//! remote authority.
//!
//! Two update channels feed a [`Shredder`] snapshot:
//!
//! - ordered change events ([`Change`]) reconciled into result lists with
//!   [`apply_change`] / [`Shredder::apply_change`];
//! - per-branch (or legacy full-state) patch [`Envelope`]s replayed by the
//!   [`PatchSynchronizer`] / [`SyncState`].
//!
//! Every write returns a new snapshot and leaves the old one as it was;
//! untouched sub-trees are shared between the two.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shredder::{Change, Shredder};
//!
//! let tree = Shredder::default()
//!     .set("blim.bla.boom[1].splif[3].splaf", "cool")
//!     .unwrap();
//! assert!(tree.has("blim.bla.boom[1].splif").unwrap());
//!
//! let change = Change::from_json(&json!({"type": "add", "new_val": {"id": 1}})).unwrap();
//! let tree = tree.apply_change("results", &change).unwrap();
//! assert_eq!(tree.get("results").unwrap().unwrap().to_json(), json!([{"id": 1}]));
//! ```

pub mod builder;
pub mod change;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod node;
pub mod reconcile;
pub mod shredder;
pub mod sync;
pub mod tree;

pub use builder::{Builder, IntoPath};
pub use change::{Change, ChangeKind};
pub use codec::{JsonPatchCodec, PatchCodec};
pub use config::ShredderConfig;
pub use envelope::{BranchPatch, Envelope};
pub use error::{Result, ShredderError};
pub use node::{ListSlots, MapEntries, Node};
pub use reconcile::apply_change;
pub use shredder::{Entry, Shredder};
pub use sync::{PatchSynchronizer, SyncState};

pub use shredder_path::{format_path, parse_path, Path, PathResolver, Segment};
