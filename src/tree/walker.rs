//! Filtered backend walks yielding resolved paths

use crate::backend::{StorageBackend, WalkEntry, WalkOptions};
use crate::error::Result;
use crate::tree::filter::CompiledFilter;
use crate::tree::path;
use futures::{Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A walk entry together with its resolved path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkItem {
    /// Walk root joined with the entry's relative path
    pub path: String,
    pub entry: WalkEntry,
}

pub type WalkItemStream<'a> = Pin<Box<dyn Stream<Item = Result<WalkItem>> + Send + 'a>>;

/// Walker over one root directory of a backend
///
/// The compiled filter backs both the directory filter and the entry filter,
/// so a rejected directory is neither yielded nor descended into.
pub struct Walker<'a> {
    backend: &'a dyn StorageBackend,
    root: String,
    filter: Option<CompiledFilter>,
}

impl<'a> Walker<'a> {
    /// `root` should already be resolved.
    pub fn new(backend: &'a dyn StorageBackend, root: impl Into<String>) -> Self {
        Self {
            backend,
            root: root.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<CompiledFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Start a fresh walk. Entries arrive depth-first in pre-order as the
    /// caller pulls them; dropping the stream ends the walk.
    pub fn walk(&self) -> WalkItemStream<'a> {
        let root = self.root.clone();
        let options = WalkOptions::filtered(self.filter.clone());
        tracing::debug!(root = %root, filtered = self.filter.is_some(), "Walking directory");
        Box::pin(self.backend.walk(&self.root, options).map_ok(move |entry| {
            let resolved = path::append(&root, &entry.path);
            tracing::trace!(path = %resolved, depth = entry.depth, "Walk entry");
            WalkItem {
                path: resolved,
                entry,
            }
        }))
    }
}
