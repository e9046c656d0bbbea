//! Tree assembly from backend walks
//!
//! The builder drives one backend walk and reacts to every yielded entry: it
//! materializes the node, indexes it by its walk-relative path, and attaches
//! it to the node one segment up. Nodes live in an arena while the walk runs and
//! are moved into their final nested form once it ends.

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::tree::content::{build_directory_node, build_file_node, ContentTransformer};
use crate::tree::filter::CompiledFilter;
use crate::tree::node::{DirectoryNode, FileNode, TreeNode};
use crate::tree::path;
use crate::tree::walker::Walker;
use futures::{Stream, TryStreamExt};
use std::collections::HashMap;
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub type FileStream<'a, C> = Pin<Box<dyn Stream<Item = Result<FileNode<C>>> + Send + 'a>>;

enum Slot<C> {
    File(FileNode<C>),
    Directory {
        node: DirectoryNode<C>,
        children: Vec<usize>,
    },
}

/// Path-keyed node table used while a walk is in flight
///
/// Keys are the walk-relative paths exactly as the backend reported them.
/// Children always land after their parent in `slots`, so the nested tree can
/// be assembled in a single reverse pass.
struct Arena<C> {
    root: DirectoryNode<C>,
    root_children: Vec<usize>,
    slots: Vec<Slot<C>>,
    index: HashMap<String, usize>,
}

impl<C> Arena<C> {
    fn new(root: DirectoryNode<C>) -> Self {
        Self {
            root,
            root_children: Vec::new(),
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn insert(&mut self, relative: &str, node: TreeNode<C>) {
        if relative.is_empty() || self.index.contains_key(relative) {
            warn!(path = %relative, "Duplicate path in walk, keeping first occurrence");
            return;
        }

        let slot_index = self.slots.len();
        self.slots.push(match node {
            TreeNode::File(file) => Slot::File(file),
            TreeNode::Directory(node) => Slot::Directory {
                node,
                children: Vec::new(),
            },
        });
        self.index.insert(relative.to_string(), slot_index);

        let Some((parent, _)) = relative.rsplit_once('/') else {
            self.root_children.push(slot_index);
            return;
        };
        match self.index.get(parent).copied() {
            Some(parent_index) => match &mut self.slots[parent_index] {
                Slot::Directory { children, .. } => children.push(slot_index),
                Slot::File(_) => debug!(path = %relative, "Parent is a file, node not attached"),
            },
            None => debug!(path = %relative, parent = %parent, "Parent not in tree, node not attached"),
        }
    }

    fn finish(self) -> DirectoryNode<C> {
        let mut built: Vec<Option<TreeNode<C>>> = Vec::with_capacity(self.slots.len());
        built.resize_with(self.slots.len(), || None);

        for (slot_index, slot) in self.slots.into_iter().enumerate().rev() {
            let node = match slot {
                Slot::File(file) => TreeNode::File(file),
                Slot::Directory { mut node, children } => {
                    node.children = take_all(&mut built, &children);
                    TreeNode::Directory(node)
                }
            };
            built[slot_index] = Some(node);
        }

        let mut root = self.root;
        root.children = take_all(&mut built, &self.root_children);
        root
    }
}

fn take_all<C>(built: &mut [Option<TreeNode<C>>], indices: &[usize]) -> Vec<TreeNode<C>> {
    indices
        .iter()
        .filter_map(|&index| built[index].take())
        .collect()
}

/// Builds node trees from one root directory of a backend
pub struct TreeBuilder<'a> {
    backend: &'a dyn StorageBackend,
    root: String,
    filter: Option<CompiledFilter>,
}

impl<'a> TreeBuilder<'a> {
    /// `root` should already be resolved.
    pub fn new(backend: &'a dyn StorageBackend, root: impl Into<String>) -> Self {
        Self {
            backend,
            root: path::normalize(&root.into()),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<CompiledFilter>) -> Self {
        self.filter = filter;
        self
    }

    fn walker(&self) -> Walker<'a> {
        Walker::new(self.backend, self.root.clone()).with_filter(self.filter.clone())
    }

    /// Build the full tree under the root
    ///
    /// The root itself becomes a depth-0 directory node named after the
    /// root's final segment. Children keep the order the walk produced them.
    #[instrument(skip(self, transformer), fields(root = %self.root))]
    pub async fn build<T>(&self, transformer: &T) -> Result<DirectoryNode<T::Output>>
    where
        T: ContentTransformer + ?Sized,
    {
        let start = Instant::now();
        debug!("Starting tree build");

        let parsed = path::parse(&self.root);
        let name = if parsed.base.is_empty() {
            parsed.root
        } else {
            parsed.base
        };
        let mut root = DirectoryNode::new(name.clone(), name, 0);
        root.modified = self.backend.last_modified(&self.root).await?;

        let mut arena = Arena::new(root);
        let mut items = self.walker().walk();
        while let Some(item) = items.try_next().await? {
            // Entries that are neither files nor directories (unfollowed
            // symlinks, sockets) become childless directory nodes
            let node: TreeNode<T::Output> = if item.entry.is_file {
                build_file_node(self.backend, &item.path, &item.entry, transformer)
                    .await?
                    .into()
            } else {
                build_directory_node(self.backend, &item.path, &item.entry)
                    .await?
                    .into()
            };
            arena.insert(&item.entry.path, node);
        }

        let node_count = arena.len();
        let tree = arena.finish();
        info!(
            node_count,
            duration_ms = start.elapsed().as_millis(),
            "Tree build completed"
        );
        Ok(tree)
    }

    /// Build the tree and return the root's children without the root.
    pub async fn build_children<T>(&self, transformer: &T) -> Result<Vec<TreeNode<T::Output>>>
    where
        T: ContentTransformer + ?Sized,
    {
        Ok(self.build(transformer).await?.children)
    }

    /// Stream materialized file nodes as the walk reaches them.
    ///
    /// Directories are walked through (unless the filter rejects them) but
    /// never yielded.
    pub fn files<'t, T>(&self, transformer: &'t T) -> FileStream<'t, T::Output>
    where
        'a: 't,
        T: ContentTransformer + ?Sized,
    {
        let backend = self.backend;
        Box::pin(self.walker().walk().try_filter_map(move |item| async move {
            if !item.entry.is_file {
                return Ok(None);
            }
            build_file_node(backend, &item.path, &item.entry, transformer)
                .await
                .map(Some)
        }))
    }
}
