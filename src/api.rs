//! Grove facade
//!
//! [`Grove`] binds one storage backend to one root directory. Every path it
//! accepts goes through the path resolver first: absolute paths are used as
//! given, relative paths are joined onto the root, and an absent path means
//! the root itself.

use crate::backend::{DirEntry, LocalBackend, LogEntry, StorageBackend};
use crate::config::GroveConfig;
use crate::error::Result;
use crate::tree::builder::{FileStream, TreeBuilder};
use crate::tree::content::{self, Content, ContentTransformer, ContentType, RawContent};
use crate::tree::filter::{compile, Filter};
use crate::tree::hydrate::{HydrateInput, HydrateSummary, Hydrator};
use crate::tree::node::{DirectoryNode, FileNode, TreeNode};
use crate::tree::path;
use crate::tree::walker::{WalkItemStream, Walker};
use futures::TryStreamExt;
use std::sync::Arc;
use tracing::{debug, instrument};
use unicode_normalization::UnicodeNormalization;

/// Directory-tree operations over one backend and root
#[derive(Clone)]
pub struct Grove {
    backend: Arc<dyn StorageBackend>,
    root: String,
    default_ignore: Vec<String>,
}

impl std::fmt::Debug for Grove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grove")
            .field("root", &self.root)
            .field("default_ignore", &self.default_ignore)
            .finish_non_exhaustive()
    }
}

impl Grove {
    /// Rooted at `.`: the working directory on disk, `/` in memory.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_root(backend, ".")
    }

    pub fn with_root(backend: impl StorageBackend + 'static, root: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(backend), root)
    }

    /// Share one backend between several facades.
    pub fn from_shared(backend: Arc<dyn StorageBackend>, root: impl Into<String>) -> Self {
        Self {
            backend,
            root: path::normalize(&root.into()),
            default_ignore: crate::config::default_ignore(),
        }
    }

    /// Build a facade from validated configuration.
    pub fn from_config(
        backend: impl StorageBackend + 'static,
        config: &GroveConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_root(backend, config.root.clone())
            .with_default_ignore(config.default_ignore.clone()))
    }

    /// Local disk facade rooted at the canonicalized configured root.
    pub fn local(config: &GroveConfig) -> Result<Self> {
        config.validate()?;
        let root = LocalBackend::canonical_root(&config.root)?;
        let backend = LocalBackend::new()
            .follow_symlinks(config.walk.follow_symlinks)
            .sort_entries(config.walk.sort_entries);
        Ok(Self::with_root(backend, root).with_default_ignore(config.default_ignore.clone()))
    }

    /// Patterns `files` ignores when no filter is given.
    pub fn with_default_ignore(mut self, patterns: Vec<String>) -> Self {
        self.default_ignore = patterns;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// Resolve a path against the root; `None` is the root itself.
    pub fn resolve_path(&self, path: Option<&str>) -> String {
        path::resolve(&self.root, path)
    }

    fn resolve(&self, path: &str) -> String {
        self.resolve_path(Some(path))
    }

    // Reads and writes

    /// Read a file in the requested encoding; `None` when it does not exist.
    pub async fn read(&self, path: &str, content_type: ContentType) -> Result<Option<Content>> {
        content::read(self.backend(), &self.resolve(path), content_type).await
    }

    pub async fn read_text(&self, path: &str) -> Result<Option<String>> {
        self.backend.read_text(&self.resolve(path)).await
    }

    pub async fn read_json(&self, path: &str) -> Result<Option<serde_json::Value>> {
        self.backend.read_json(&self.resolve(path)).await
    }

    pub async fn read_bytes(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.backend.read_bytes(&self.resolve(path)).await
    }

    pub async fn read_base64(&self, path: &str) -> Result<Option<String>> {
        Ok(self
            .read_bytes(path)
            .await?
            .map(|bytes| content::encode_base64(&bytes)))
    }

    /// Write text or bytes, creating missing parent directories.
    pub async fn write(&self, path: &str, contents: impl AsRef<[u8]>) -> Result<()> {
        self.backend
            .write(&self.resolve(path), contents.as_ref())
            .await
    }

    /// Copy a file, or a directory with everything below it.
    pub async fn copy(&self, source: &str, destination: &str) -> Result<()> {
        let source = self.resolve(source);
        let destination = self.resolve(destination);
        if self.backend.is_file(&source).await? {
            self.backend.copy_file(&source, &destination).await
        } else {
            self.backend.copy_tree(&source, &destination).await
        }
    }

    /// Move a file, or a directory with everything below it.
    pub async fn move_to(&self, source: &str, destination: &str) -> Result<()> {
        let source = self.resolve(source);
        let destination = self.resolve(destination);
        if self.backend.is_file(&source).await? {
            self.backend.move_file(&source, &destination).await
        } else {
            self.backend.move_tree(&source, &destination).await
        }
    }

    /// Delete a file or a whole directory; `false` when nothing was there.
    pub async fn delete(&self, path: &str) -> Result<bool> {
        let path = self.resolve(path);
        if self.backend.is_directory(&path).await? {
            self.backend.delete_tree(&path).await
        } else {
            self.backend.delete_file(&path).await
        }
    }

    /// Direct children of a directory.
    pub async fn list(&self, dir: Option<&str>) -> Result<Vec<DirEntry>> {
        self.backend.list(&self.resolve_path(dir)).await
    }

    // Walks and trees

    /// Stream every entry below `dir` accepted by `filter`, with resolved paths.
    pub fn walk(&self, dir: Option<&str>, filter: Option<&Filter>) -> Result<WalkItemStream<'_>> {
        let compiled = compile(filter)?;
        Ok(Walker::new(self.backend(), self.resolve_path(dir))
            .with_filter(compiled)
            .walk())
    }

    fn builder(&self, dir: Option<&str>, filter: Option<&Filter>) -> Result<TreeBuilder<'_>> {
        Ok(TreeBuilder::new(self.backend(), self.resolve_path(dir)).with_filter(compile(filter)?))
    }

    /// Stream every file below `dir` with its raw text.
    ///
    /// Without a filter the default ignore list applies.
    pub fn files(&self, dir: Option<&str>, filter: Option<&Filter>) -> Result<FileStream<'_, String>> {
        self.files_with(dir, filter, &RawContent)
    }

    pub fn files_with<'a, T>(
        &'a self,
        dir: Option<&str>,
        filter: Option<&Filter>,
        transformer: &'a T,
    ) -> Result<FileStream<'a, T::Output>>
    where
        T: ContentTransformer + ?Sized,
    {
        let default_filter;
        let filter = match filter {
            Some(filter) => filter,
            None => {
                default_filter = Filter::Patterns(self.default_ignore.clone());
                &default_filter
            }
        };
        Ok(self.builder(dir, Some(filter))?.files(transformer))
    }

    /// Materialize one file; `None` when no file exists at the path.
    pub async fn file(&self, path: &str) -> Result<Option<FileNode>> {
        self.file_with(path, &RawContent).await
    }

    /// Only the file's parent directory is listed; nothing below it is walked.
    /// A missing parent means the file is absent too.
    pub async fn file_with<T>(&self, path: &str, transformer: &T) -> Result<Option<FileNode<T::Output>>>
    where
        T: ContentTransformer + ?Sized,
    {
        let resolved = self.resolve(path);
        let name = path::basename(&resolved);
        // Input paths are NFC; names on disk may not be
        let only_target = Filter::predicate(move |entry| {
            entry.depth == 1 && entry.name.nfc().eq(name.chars())
        });
        let parent = path::dirname(&resolved);
        debug!(path = %resolved, "Looking up single file");
        if !self.backend.is_directory(&parent).await? {
            return Ok(None);
        }
        TreeBuilder::new(self.backend(), parent)
            .with_filter(compile(Some(&only_target))?)
            .files(transformer)
            .try_next()
            .await
    }

    /// Build the tree below `dir` with raw text content.
    pub async fn tree(&self, dir: Option<&str>, filter: Option<&Filter>) -> Result<DirectoryNode> {
        self.tree_with(dir, filter, &RawContent).await
    }

    #[instrument(skip(self, filter, transformer))]
    pub async fn tree_with<T>(
        &self,
        dir: Option<&str>,
        filter: Option<&Filter>,
        transformer: &T,
    ) -> Result<DirectoryNode<T::Output>>
    where
        T: ContentTransformer + ?Sized,
    {
        self.builder(dir, filter)?.build(transformer).await
    }

    /// The children of `dir` as top-level nodes, without a root node.
    pub async fn directory(&self, dir: Option<&str>, filter: Option<&Filter>) -> Result<Vec<TreeNode>> {
        self.directory_with(dir, filter, &RawContent).await
    }

    pub async fn directory_with<T>(
        &self,
        dir: Option<&str>,
        filter: Option<&Filter>,
        transformer: &T,
    ) -> Result<Vec<TreeNode<T::Output>>>
    where
        T: ContentTransformer + ?Sized,
    {
        self.builder(dir, filter)?.build_children(transformer).await
    }

    // Hydration

    /// Write a declared or built tree under `target` (the root when `None`).
    pub async fn hydrate<'i>(
        &self,
        input: impl Into<HydrateInput<'i>>,
        target: Option<&str>,
    ) -> Result<HydrateSummary> {
        Hydrator::new(self.backend())
            .hydrate(input.into(), &self.resolve_path(target))
            .await
    }

    // Operation log

    pub fn log_start(&self, label: &str) {
        self.backend.log_start(label);
    }

    pub fn log_end(&self, label: &str) -> Vec<LogEntry> {
        self.backend.log_end(label)
    }
}
