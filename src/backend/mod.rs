//! Storage backends
//!
//! The tree engine only ever talks to storage through [`StorageBackend`]. Two
//! implementations ship with the crate: [`MemoryBackend`] (an in-memory store,
//! handy for tests and fixtures) and [`LocalBackend`] (the local disk).

pub mod local;
pub mod memory;
pub mod oplog;

pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use oplog::{LogEntry, OperationKind, OperationLog};

use crate::error::Result;
use crate::tree::filter::CompiledFilter;
use crate::tree::path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// One record yielded by a recursive walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkEntry {
    /// Path relative to the walk root, `/`-separated
    pub path: String,
    /// Final path segment
    pub name: String,
    /// Direct children of the walk root have depth 1
    pub depth: usize,
    pub is_file: bool,
    pub is_directory: bool,
    pub is_symlink: bool,
}

impl WalkEntry {
    /// Build an entry for a relative path; depth is the number of segments.
    pub fn new(relative_path: &str, is_file: bool) -> Self {
        let relative_path = path::normalize(relative_path);
        Self {
            name: path::basename(&relative_path),
            depth: relative_path.split('/').count(),
            path: relative_path,
            is_file,
            is_directory: !is_file,
            is_symlink: false,
        }
    }
}

/// A direct child returned by [`StorageBackend::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_file: bool,
    pub is_directory: bool,
    pub is_symlink: bool,
}

/// Filters a backend applies during a walk
///
/// `entry_filter` decides whether an entry is yielded; `directory_filter`
/// decides whether a directory is descended into. `None` accepts everything.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub directory_filter: Option<CompiledFilter>,
    pub entry_filter: Option<CompiledFilter>,
}

impl WalkOptions {
    /// Use one filter for both descent and yield decisions.
    pub fn filtered(filter: Option<CompiledFilter>) -> Self {
        Self {
            directory_filter: filter.clone(),
            entry_filter: filter,
        }
    }

    pub async fn yields(&self, entry: &WalkEntry) -> Result<bool> {
        match &self.entry_filter {
            Some(filter) => filter.accepts(entry).await,
            None => Ok(true),
        }
    }

    pub async fn descends_into(&self, entry: &WalkEntry) -> Result<bool> {
        match &self.directory_filter {
            Some(filter) => filter.accepts(entry).await,
            None => Ok(true),
        }
    }
}

/// Stream of walk entries, depth-first pre-order
pub type WalkStream<'a> = Pin<Box<dyn Stream<Item = Result<WalkEntry>> + Send + 'a>>;

/// Primitive storage operations the tree engine is built on
///
/// Paths are `/`-separated strings. Reads of missing files return `Ok(None)`
/// rather than an error; writes and directory creation create missing parents.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn read_text(&self, path: &str) -> Result<Option<String>>;
    async fn read_bytes(&self, path: &str) -> Result<Option<Vec<u8>>>;
    async fn read_json(&self, path: &str) -> Result<Option<serde_json::Value>>;

    async fn write(&self, path: &str, contents: &[u8]) -> Result<()>;
    async fn create_directory(&self, path: &str) -> Result<()>;

    async fn copy_file(&self, source: &str, destination: &str) -> Result<()>;
    async fn copy_tree(&self, source: &str, destination: &str) -> Result<()>;
    async fn move_file(&self, source: &str, destination: &str) -> Result<()>;
    async fn move_tree(&self, source: &str, destination: &str) -> Result<()>;

    /// Returns `false` when nothing existed at the path.
    async fn delete_file(&self, path: &str) -> Result<bool>;
    /// Returns `false` when nothing existed at the path.
    async fn delete_tree(&self, path: &str) -> Result<bool>;

    async fn is_file(&self, path: &str) -> Result<bool>;
    async fn is_directory(&self, path: &str) -> Result<bool>;
    async fn size(&self, path: &str) -> Result<u64>;
    async fn last_modified(&self, path: &str) -> Result<Option<DateTime<Utc>>>;

    async fn list(&self, path: &str) -> Result<Vec<DirEntry>>;

    /// Recursively walk a directory, applying the filters in `options`.
    ///
    /// A directory rejected by the directory filter is never descended into.
    fn walk<'a>(&'a self, path: &str, options: WalkOptions) -> WalkStream<'a>;

    /// Start recording operations under `label`.
    fn log_start(&self, label: &str);
    /// Stop recording under `label` and return what was recorded.
    fn log_end(&self, label: &str) -> Vec<LogEntry>;
}

/// Pre-order entry source with the ability to skip a directory's contents
pub(crate) trait PreorderSource: Send {
    fn next_entry(&mut self) -> Option<Result<WalkEntry>>;

    /// Skip the descendants of the most recently returned entry.
    fn skip_children(&mut self);
}

/// Turn a pre-order source into a filtered walk stream.
pub(crate) fn drive_walk<'a, S>(source: S, options: WalkOptions) -> WalkStream<'a>
where
    S: PreorderSource + 'a,
{
    Box::pin(futures::stream::try_unfold(
        (source, options),
        |(mut source, options)| async move {
            loop {
                let Some(entry) = source.next_entry().transpose()? else {
                    return Ok(None);
                };
                let yielded = options.yields(&entry).await?;
                if entry.is_directory && !options.descends_into(&entry).await? {
                    source.skip_children();
                }
                if yielded {
                    return Ok(Some((entry, (source, options))));
                }
            }
        },
    ))
}

/// A walk that fails before yielding anything.
pub(crate) fn failed_walk<'a>(error: crate::error::GroveError) -> WalkStream<'a> {
    Box::pin(futures::stream::once(async move { Err(error) }))
}
