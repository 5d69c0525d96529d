//! The [`Shredder`] facade: an immutable snapshot handle with path-addressed
//! reads and snapshot-producing writes.

use std::sync::Arc;

use serde_json::Value;
use shredder_patch::Op;
use shredder_path::PathResolver;

use crate::builder::{resolve_path, Builder, IntoPath};
use crate::change::Change;
use crate::config::ShredderConfig;
use crate::envelope::Envelope;
use crate::error::{Result, ShredderError};
use crate::node::{MapEntries, Node};
use crate::sync::PatchSynchronizer;
use crate::tree;

/// Result of [`Shredder::get`]: containers come back as tree handles sharing
/// the resolver and config, scalars as plain nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Tree(Shredder),
    Value(Node),
}

impl Entry {
    pub fn is_tree(&self) -> bool {
        matches!(self, Entry::Tree(_))
    }

    pub fn as_tree(&self) -> Option<&Shredder> {
        match self {
            Entry::Tree(tree) => Some(tree),
            Entry::Value(_) => None,
        }
    }

    pub fn as_node(&self) -> &Node {
        match self {
            Entry::Tree(tree) => tree.state(),
            Entry::Value(node) => node,
        }
    }

    pub fn into_node(self) -> Node {
        match self {
            Entry::Tree(tree) => tree.into_state(),
            Entry::Value(node) => node,
        }
    }

    pub fn to_json(&self) -> Value {
        self.as_node().to_json()
    }
}

/// A persistent tree snapshot.
///
/// Writes never touch `self`; they return a new snapshot sharing every
/// untouched sub-tree with this one.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use shredder::Shredder;
///
/// let before = Shredder::new(json!({"user": {"name": "ada"}}));
/// let after = before.set("user.tags[1]", "admin").unwrap();
///
/// assert_eq!(after.to_json(), json!({"user": {"name": "ada", "tags": [null, "admin"]}}));
/// assert_eq!(before.to_json(), json!({"user": {"name": "ada"}}));
/// ```
#[derive(Debug, Clone)]
pub struct Shredder {
    state: Node,
    key: Option<String>,
    resolver: Arc<PathResolver>,
    config: Arc<ShredderConfig>,
}

impl Default for Shredder {
    fn default() -> Self {
        Self::new(Node::empty_map())
    }
}

impl Shredder {
    /// Wrap `state`. `Null` and scalars start as an empty map.
    pub fn new(state: impl Into<Node>) -> Self {
        Self::with_config(state, ShredderConfig::default())
    }

    pub fn with_config(state: impl Into<Node>, config: ShredderConfig) -> Self {
        let resolver = Arc::new(PathResolver::new(config.path_cache_capacity));
        Self::with_resolver(state, resolver, Arc::new(config))
    }

    /// Build a snapshot sharing an existing resolver cache.
    pub fn with_resolver(state: impl Into<Node>, resolver: Arc<PathResolver>, config: Arc<ShredderConfig>) -> Self {
        let state = state.into();
        let state = if state.is_container() { state } else { Node::empty_map() };
        Self {
            state,
            key: None,
            resolver,
            config,
        }
    }

    /// Strict JSON constructor: the root must be an object or an array.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) | Value::Array(_) => Ok(Self::new(value)),
            other => Err(ShredderError::RootType { value: other }),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn state(&self) -> &Node {
        &self.state
    }

    pub fn into_state(self) -> Node {
        self.state
    }

    pub fn resolver(&self) -> &Arc<PathResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &ShredderConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn to_json(&self) -> Value {
        self.state.to_json()
    }

    /// Same handle settings, different root.
    pub(crate) fn derive(&self, state: Node) -> Self {
        Self {
            state,
            key: self.key.clone(),
            resolver: Arc::clone(&self.resolver),
            config: Arc::clone(&self.config),
        }
    }

    fn builder(&self) -> Builder {
        Builder::new(self.state.clone(), Arc::clone(&self.resolver), Arc::clone(&self.config))
    }

    fn mutate(&self, f: impl FnOnce(&mut Builder) -> Result<&mut Builder>) -> Result<Self> {
        let mut builder = self.builder();
        f(&mut builder)?;
        Ok(self.derive(builder.finish()))
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Value at `path`, `None` when absent.
    pub fn get(&self, path: impl IntoPath) -> Result<Option<Entry>> {
        let path = resolve_path(&self.resolver, path)?;
        Ok(tree::get_in(&self.state, &path).map(|node| {
            if node.is_container() {
                Entry::Tree(self.derive(node.clone()))
            } else {
                Entry::Value(node.clone())
            }
        }))
    }

    /// Like [`get`](Self::get), with `fallback` standing in for absent values.
    pub fn get_or(&self, path: impl IntoPath, fallback: impl Into<Node>) -> Result<Entry> {
        match self.get(path)? {
            Some(entry) => Ok(entry),
            None => {
                let node = fallback.into();
                Ok(if node.is_container() {
                    Entry::Tree(self.derive(node))
                } else {
                    Entry::Value(node)
                })
            }
        }
    }

    pub fn has(&self, path: impl IntoPath) -> Result<bool> {
        let path = resolve_path(&self.resolver, path)?;
        Ok(tree::get_in(&self.state, &path).is_some())
    }

    /// Root entries whose key is one of `keys`, in root order.
    ///
    /// List roots match on the decimal index. Keys are taken literally.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use shredder::Shredder;
    ///
    /// let tree = Shredder::new(json!({"a": 1, "b": 2, "c": 3}));
    /// assert_eq!(tree.pick(["c", "a", "zz"]).to_json(), json!({"a": 1, "c": 3}));
    /// ```
    pub fn pick<K: AsRef<str>>(&self, keys: impl IntoIterator<Item = K>) -> Node {
        let wanted: Vec<K> = keys.into_iter().collect();
        let wants = |key: &str| wanted.iter().any(|k| k.as_ref() == key);
        let picked: MapEntries = match &self.state {
            Node::Map(map) => map
                .iter()
                .filter(|(key, _)| wants(key.as_str()))
                .map(|(key, val)| (key.clone(), val.clone()))
                .collect(),
            Node::List(list) => list
                .iter()
                .enumerate()
                .filter_map(|(idx, slot)| Some((idx.to_string(), slot.clone()?)))
                .filter(|(key, _)| wants(key.as_str()))
                .collect(),
            _ => MapEntries::new(),
        };
        Node::Map(Arc::new(picked))
    }

    // ── Writes ────────────────────────────────────────────────────────────

    pub fn set(&self, path: impl IntoPath, value: impl Into<Node>) -> Result<Self> {
        self.mutate(|b| b.set(path, value))
    }

    pub fn del(&self, path: impl IntoPath) -> Result<Self> {
        self.mutate(|b| b.del(path))
    }

    pub fn merge(&self, path: impl IntoPath, value: impl Into<Node>) -> Result<Self> {
        self.mutate(|b| b.merge(path, value))
    }

    pub fn merge_deep(&self, path: impl IntoPath, value: impl Into<Node>) -> Result<Self> {
        self.mutate(|b| b.merge_deep(path, value))
    }

    pub fn push(&self, path: impl IntoPath, value: impl Into<Node>) -> Result<Self> {
        self.mutate(|b| b.push(path, value))
    }

    pub fn push_at(&self, path: impl IntoPath, value: impl Into<Node>, offset: usize) -> Result<Self> {
        self.mutate(|b| b.push_at(path, value, offset))
    }

    pub fn pop(&self, path: impl IntoPath) -> Result<Self> {
        self.mutate(|b| b.pop(path))
    }

    pub fn concat(&self, path: impl IntoPath, value: impl Into<Node>) -> Result<Self> {
        self.mutate(|b| b.concat(path, value))
    }

    pub fn unpush(&self, path: impl IntoPath, value: impl Into<Node>) -> Result<Self> {
        self.mutate(|b| b.unpush(path, value))
    }

    pub fn clear(&self, path: impl IntoPath) -> Result<Self> {
        self.mutate(|b| b.clear(path))
    }

    pub fn move_before(&self, path: impl IntoPath, value: impl Into<Node>, before: impl Into<Node>) -> Result<Self> {
        self.mutate(|b| b.move_before(path, value, before))
    }

    /// Remove each of `keys` from the root. Missing keys are skipped.
    pub fn delete_all<K: AsRef<str>>(&self, keys: impl IntoIterator<Item = K>) -> Result<Self> {
        self.mutate(|b| b.delete_all(keys))
    }

    /// Reconcile the list at `path` with one change event.
    pub fn apply_change(&self, path: impl IntoPath, change: &Change) -> Result<Self> {
        self.mutate(|b| b.apply_change(path, change))
    }

    /// Decode `raw` as a change event and reconcile the list at `path`.
    pub fn apply_change_json(&self, path: impl IntoPath, raw: &Value) -> Result<Self> {
        let change = Change::from_json(raw)?;
        self.apply_change(path, &change)
    }

    /// Run several writes against one transient root, producing one snapshot.
    ///
    /// When `mutator` fails nothing is produced and `self` is untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use shredder::Shredder;
    ///
    /// let tree = Shredder::default();
    /// let next = tree
    ///     .with_mutations(|b| {
    ///         b.set("a", 1i64)?.push("list", "x")?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    /// assert_eq!(next.to_json(), json!({"a": 1, "list": ["x"]}));
    /// ```
    pub fn with_mutations<F>(&self, mutator: F) -> Result<Self>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        let mut builder = self.builder();
        mutator(&mut builder)?;
        let next = self.derive(builder.finish());
        tracing::trace!(key = ?self.key, "mutations finalized");
        Ok(next)
    }

    /// Next snapshot after one sync envelope, using the JSON Patch codec.
    ///
    /// The result keeps the handle settings of `current`.
    pub fn apply_patches(current: &Shredder, previous: &Shredder, envelope: &Envelope<Vec<Op>>) -> Result<Shredder> {
        let synchronizer: PatchSynchronizer = PatchSynchronizer::default();
        let next = synchronizer.apply(&current.state, &previous.state, envelope)?;
        Ok(current.derive(next))
    }
}

impl PartialEq for Shredder {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl PartialEq<Node> for Shredder {
    fn eq(&self, other: &Node) -> bool {
        self.state == *other
    }
}

impl From<Shredder> for Node {
    fn from(tree: Shredder) -> Self {
        tree.state
    }
}

impl From<&Shredder> for Node {
    fn from(tree: &Shredder) -> Self {
        tree.state.clone()
    }
}

impl std::fmt::Display for Shredder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.state, f)
    }
}
