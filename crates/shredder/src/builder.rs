//! Transient write handle.
//!
//! A [`Builder`] owns a working root and applies any number of writes to it.
//! Every facade write runs through one, and [`Shredder::with_mutations`]
//! hands one to the caller so a batch of writes produces a single snapshot.
//!
//! [`Shredder::with_mutations`]: crate::Shredder::with_mutations

use std::sync::Arc;

use shredder_path::{format_path, is_reserved, Path, PathResolver, Segment};

use crate::change::Change;
use crate::config::ShredderConfig;
use crate::error::{Result, ShredderError};
use crate::node::{ListSlots, Node};
use crate::reconcile::{apply_change, reconcile};
use crate::tree;

/// Anything that can address a location in a tree.
///
/// Strings go through the resolver cache; segment slices are used as given.
pub trait IntoPath {
    fn into_path(self, resolver: &PathResolver) -> Path;
}

impl IntoPath for &str {
    fn into_path(self, resolver: &PathResolver) -> Path {
        resolver.resolve(self)
    }
}

impl IntoPath for &String {
    fn into_path(self, resolver: &PathResolver) -> Path {
        resolver.resolve(self)
    }
}

impl IntoPath for &[Segment] {
    fn into_path(self, _resolver: &PathResolver) -> Path {
        self.to_vec()
    }
}

impl IntoPath for &Path {
    fn into_path(self, _resolver: &PathResolver) -> Path {
        self.clone()
    }
}

impl IntoPath for Path {
    fn into_path(self, _resolver: &PathResolver) -> Path {
        self
    }
}

/// Resolve `path` and reject paths starting with a reserved tool name.
pub(crate) fn resolve_path(resolver: &PathResolver, path: impl IntoPath) -> Result<Path> {
    let path = path.into_path(resolver);
    if is_reserved(&path) {
        return Err(ShredderError::ReservedPath {
            path: format_path(&path),
        });
    }
    Ok(path)
}

#[derive(Debug)]
pub struct Builder {
    root: Node,
    resolver: Arc<PathResolver>,
    config: Arc<ShredderConfig>,
}

impl Builder {
    pub(crate) fn new(root: Node, resolver: Arc<PathResolver>, config: Arc<ShredderConfig>) -> Self {
        Self { root, resolver, config }
    }

    pub(crate) fn finish(self) -> Node {
        self.root
    }

    /// The working root as it stands.
    pub fn state(&self) -> &Node {
        &self.root
    }

    pub fn get(&self, path: impl IntoPath) -> Result<Option<&Node>> {
        let path = resolve_path(&self.resolver, path)?;
        Ok(tree::get_in(&self.root, &path))
    }

    fn trace_write(&self, op: &'static str, path: &[Segment]) {
        if self.config.log_state {
            tracing::trace!(op, path = %format_path(path), state = %format!("{:#}", self.root), "next state");
        } else {
            tracing::trace!(op, path = %format_path(path), "next state");
        }
    }

    /// Structural write of `value` at `path`.
    ///
    /// The path is checked before anything is written, so a failing write
    /// leaves the builder as it was.
    fn write(&mut self, op: &'static str, path: &[Segment], value: Node) -> Result<()> {
        if path.is_empty() {
            if !value.is_container() {
                return Err(ShredderError::RootType {
                    value: value.to_json(),
                });
            }
            self.root = value;
        } else {
            tree::write_in(&mut self.root, path, value, self.config.max_index_gap)?;
        }
        self.trace_write(op, path);
        Ok(())
    }

    /// Slots of the list at `path`; `None` when nothing is there.
    fn list_ref(&self, path: &[Segment]) -> Result<Option<&ListSlots>> {
        match tree::get_in(&self.root, path) {
            None => Ok(None),
            Some(Node::List(list)) => Ok(Some(list)),
            Some(_) => Err(ShredderError::NotAList {
                path: format_path(path),
            }),
        }
    }

    /// Owned slots of the list at `path`, created empty when missing.
    fn list_mut(&mut self, path: &[Segment]) -> Result<&mut ListSlots> {
        tree::list_mut(&mut self.root, path, self.config.max_index_gap)
    }

    pub fn set(&mut self, path: impl IntoPath, value: impl Into<Node>) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        self.write("set", &path, value.into())?;
        Ok(self)
    }

    /// Remove the value at `path`. Missing paths are left alone.
    pub fn del(&mut self, path: impl IntoPath) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        if path.is_empty() {
            return Err(ShredderError::RootType {
                value: serde_json::Value::Null,
            });
        }
        if tree::delete_in(&mut self.root, &path) {
            self.trace_write("del", &path);
        }
        Ok(self)
    }

    fn merge_with(&mut self, op: &'static str, path: impl IntoPath, value: Node, deep: bool) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        let current = tree::get_in(&self.root, &path)
            .cloned()
            .unwrap_or_else(Node::empty_map);
        self.write(op, &path, tree::merge_nodes(current, value, deep))?;
        Ok(self)
    }

    pub fn merge(&mut self, path: impl IntoPath, value: impl Into<Node>) -> Result<&mut Self> {
        self.merge_with("merge", path, value.into(), false)
    }

    pub fn merge_deep(&mut self, path: impl IntoPath, value: impl Into<Node>) -> Result<&mut Self> {
        self.merge_with("merge_deep", path, value.into(), true)
    }

    pub fn push(&mut self, path: impl IntoPath, value: impl Into<Node>) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        self.list_mut(&path)?.push(Some(value.into()));
        self.trace_write("push", &path);
        Ok(self)
    }

    /// Insert before `offset`, clamped to the list length.
    pub fn push_at(&mut self, path: impl IntoPath, value: impl Into<Node>, offset: usize) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        let list = self.list_mut(&path)?;
        let offset = offset.min(list.len());
        list.insert(offset, Some(value.into()));
        self.trace_write("push_at", &path);
        Ok(self)
    }

    pub fn pop(&mut self, path: impl IntoPath) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        self.list_mut(&path)?.pop();
        self.trace_write("pop", &path);
        Ok(self)
    }

    /// Append the elements of a list, or a single non-list value.
    pub fn concat(&mut self, path: impl IntoPath, value: impl Into<Node>) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        let value = value.into();
        let list = self.list_mut(&path)?;
        match value {
            Node::List(items) => list.extend(items.iter().cloned()),
            other => list.push(Some(other)),
        }
        self.trace_write("concat", &path);
        Ok(self)
    }

    /// Remove the first element equal to `value`.
    pub fn unpush(&mut self, path: impl IntoPath, value: impl Into<Node>) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        let value = value.into();
        let found = self
            .list_ref(&path)?
            .and_then(|list| list.iter().position(|slot| slot.as_ref() == Some(&value)));
        if let Some(idx) = found {
            self.list_mut(&path)?.remove(idx);
            self.trace_write("unpush", &path);
        }
        Ok(self)
    }

    /// Replace whatever is at `path` with an empty list.
    pub fn clear(&mut self, path: impl IntoPath) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        if tree::get_in(&self.root, &path).is_some() {
            self.write("clear", &path, Node::empty_list())?;
        }
        Ok(self)
    }

    /// Move `value` right before `before`, or to the end when `before` is not
    /// in the list.
    pub fn move_before(
        &mut self,
        path: impl IntoPath,
        value: impl Into<Node>,
        before: impl Into<Node>,
    ) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        let (value, before) = (value.into(), before.into());
        let positions = self.list_ref(&path)?.and_then(|list| {
            let from = list.iter().position(|slot| slot.as_ref() == Some(&value))?;
            Some((from, list.iter().position(|slot| slot.as_ref() == Some(&before))))
        });
        let Some((from, target)) = positions else {
            return Ok(self);
        };
        let list = self.list_mut(&path)?;
        let moved = list.remove(from);
        match target {
            None => list.push(moved),
            Some(to) => {
                let to = if from < to { to - 1 } else { to };
                list.insert(to, moved);
            }
        }
        self.trace_write("move_before", &path);
        Ok(self)
    }

    /// Reconcile the list at `path` with one change event.
    ///
    /// A missing list starts empty and a map contributes its values in order.
    pub fn apply_change(&mut self, path: impl IntoPath, change: &Change) -> Result<&mut Self> {
        let path = resolve_path(&self.resolver, path)?;
        let seeded: Option<ListSlots> = match tree::get_in(&self.root, &path) {
            Some(Node::List(_)) => None,
            None => Some(Vec::new()),
            Some(Node::Map(map)) => Some(map.values().cloned().map(Some).collect()),
            Some(_) => {
                return Err(ShredderError::NotAList {
                    path: format_path(&path),
                })
            }
        };
        match seeded {
            None => {
                reconcile(self.list_mut(&path)?, change)?;
                self.trace_write("apply_change", &path);
            }
            Some(list) => {
                let list = apply_change(list, change)?;
                self.write("apply_change", &path, Node::List(Arc::new(list)))?;
            }
        }
        Ok(self)
    }

    /// Remove each of `keys` from the root, in order.
    ///
    /// Keys are taken literally, not as paths; numeric keys address list slots.
    pub fn delete_all<K: AsRef<str>>(&mut self, keys: impl IntoIterator<Item = K>) -> Result<&mut Self> {
        let mut removed = 0usize;
        for key in keys {
            let segment = Segment::from_token(key.as_ref());
            if tree::delete_in(&mut self.root, std::slice::from_ref(&segment)) {
                removed += 1;
            }
        }
        if removed > 0 {
            self.trace_write("delete_all", &[]);
        }
        Ok(self)
    }
}
