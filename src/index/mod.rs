//! Client-side file system index.
//!
//! The object store exposes a flat key space with no directory concept.
//! This module maintains a hierarchical view over it: a tree keyed by path
//! segments, built from the flat listing, answering directory and folder-tree
//! queries in time proportional to the result size rather than the total
//! object count.

pub mod path;

use crate::error::ExplorerError;
use crate::types::{DirectoryContents, DirectoryRef, FolderNode, ObjectEntry};
use std::collections::BTreeMap;

/// One node of the index tree.
///
/// A node is a leaf iff `entry` is present (an object is stored at exactly
/// this path). A node may be a leaf and still have children: the store has no
/// directory semantics, so an object `a/b` and an object `a/b/c` coexist.
#[derive(Debug, Clone, Default)]
pub struct PathNode {
    children: BTreeMap<String, PathNode>,
    entry: Option<ObjectEntry>,
}

impl PathNode {
    fn is_empty(&self) -> bool {
        self.entry.is_none() && self.children.is_empty()
    }
}

/// Hierarchical index over the store's flat key space.
///
/// Created empty, populated by bulk insert from a full listing or
/// incrementally after mutations, never persisted. Children iterate in
/// lexicographic, case-sensitive segment order, which is the sort order
/// every derived view requires.
#[derive(Debug, Clone, Default)]
pub struct FileSystemIndex {
    root: PathNode,
}

impl FileSystemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object at `path`, creating intermediate nodes as needed.
    ///
    /// Idempotent: re-inserting an existing path overwrites its metadata,
    /// not the structure. A path that normalizes to zero segments inserts
    /// nothing.
    pub fn insert(&mut self, path: &str, entry: ObjectEntry) {
        let segs = path::segments(path);
        if segs.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for seg in segs {
            node = node.children.entry(seg.to_string()).or_default();
        }
        node.entry = Some(entry);
    }

    /// Remove the object at `path`.
    ///
    /// Silent no-op when any segment is missing. Intermediate nodes left
    /// with no children and no entry are pruned on the way back up, so a
    /// deletion never leaves phantom empty directories behind. Nodes hold
    /// no parent references; the recursive descent itself provides the
    /// cleanup path.
    pub fn remove(&mut self, path: &str) {
        let segs = path::segments(path);
        if segs.is_empty() {
            return;
        }
        Self::remove_at(&mut self.root, &segs);
    }

    fn remove_at(node: &mut PathNode, segs: &[&str]) {
        match segs.split_first() {
            None => {
                node.entry = None;
            }
            Some((head, rest)) => {
                let Some(child) = node.children.get_mut(*head) else {
                    return;
                };
                Self::remove_at(child, rest);
                if child.is_empty() {
                    node.children.remove(*head);
                }
            }
        }
    }

    /// Metadata of the object stored at exactly `path`, if any.
    pub fn entry(&self, path: &str) -> Option<&ObjectEntry> {
        self.walk(path).and_then(|node| node.entry.as_ref())
    }

    /// Immediate contents of the directory at `path`.
    ///
    /// A failed walk is an empty directory, not an error. Children with at
    /// least one child of their own are directories; leaf children are
    /// files; a child can be both and then appears in both lists. Both
    /// lists come out sorted ascending by name.
    pub fn directory_contents(&self, path: &str) -> DirectoryContents {
        let Some(node) = self.walk(path) else {
            return DirectoryContents::default();
        };
        let dir_key = path::normalize(path);
        let mut contents = DirectoryContents::default();
        for (name, child) in &node.children {
            if !child.children.is_empty() {
                contents.directories.push(DirectoryRef {
                    name: name.clone(),
                    path: path::to_absolute(&path::join(&dir_key, name)),
                });
            }
            if let Some(entry) = &child.entry {
                contents.files.push(entry.clone());
            }
        }
        contents
    }

    /// Directory skeleton of the whole index: one node per path segment that
    /// has at least one child, under a synthetic root labeled `/`. Pure leaf
    /// files are excluded entirely.
    pub fn folder_structure(&self) -> FolderNode {
        Self::folders_under("/", "/", &self.root)
    }

    fn folders_under(name: &str, abs_path: &str, node: &PathNode) -> FolderNode {
        let children = node
            .children
            .iter()
            .filter(|(_, child)| !child.children.is_empty())
            .map(|(seg, child)| {
                let child_path = if abs_path == "/" {
                    format!("/{}", seg)
                } else {
                    format!("{}/{}", abs_path, seg)
                };
                Self::folders_under(seg, &child_path, child)
            })
            .collect();
        FolderNode {
            name: name.to_string(),
            path: abs_path.to_string(),
            children,
        }
    }

    /// Number of stored objects in the index.
    pub fn file_count(&self) -> usize {
        fn count(node: &PathNode) -> usize {
            node.entry.iter().count() + node.children.values().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    /// Defensive invariant walk.
    ///
    /// A non-root node with neither an entry nor children, or an entry whose
    /// recorded path disagrees with its position in the tree, indicates the
    /// index got corrupted. Never expected to fire in correct operation.
    pub fn validate(&self) -> Result<(), ExplorerError> {
        fn check(key: &str, node: &PathNode) -> Result<(), ExplorerError> {
            if !key.is_empty() && node.is_empty() {
                return Err(ExplorerError::IndexCorruption(format!(
                    "empty node at '{}'",
                    key
                )));
            }
            if let Some(entry) = &node.entry {
                if entry.path != key {
                    return Err(ExplorerError::IndexCorruption(format!(
                        "entry path '{}' stored at '{}'",
                        entry.path, key
                    )));
                }
            }
            for (seg, child) in &node.children {
                let child_key = path::join(key, seg);
                check(&child_key, child)?;
            }
            Ok(())
        }
        check("", &self.root)
    }

    fn walk(&self, path: &str) -> Option<&PathNode> {
        let mut node = &self.root;
        for seg in path::segments(path) {
            node = node.children.get(seg)?;
        }
        Some(node)
    }
}
