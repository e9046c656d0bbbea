//! Local filesystem storage backend
//!
//! Paths are handed to the OS as given; the facade resolves them against its
//! root first. Walks use `walkdir` and report paths relative to the walk root
//! with `/` separators on every platform.

use super::oplog::{LogEntry, OperationKind, OperationLog};
use super::{drive_walk, failed_walk, DirEntry, PreorderSource, StorageBackend, WalkEntry, WalkOptions, WalkStream};
use crate::error::{GroveError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Local disk backend
#[derive(Debug)]
pub struct LocalBackend {
    follow_symlinks: bool,
    sort_entries: bool,
    log: OperationLog,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    /// Symlinks are not followed; listings and walks are sorted by name.
    pub fn new() -> Self {
        Self {
            follow_symlinks: false,
            sort_entries: true,
            log: OperationLog::new(),
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// When disabled, entries come back in whatever order the OS reports.
    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Canonicalize a directory for use as a facade root.
    ///
    /// Uses `dunce` so Windows paths stay in their familiar form.
    pub fn canonical_root(dir: impl AsRef<Path>) -> Result<String> {
        let dir = dir.as_ref();
        let canonical = dunce::canonicalize(dir)
            .map_err(|e| GroveError::from_io(dir.display().to_string(), e))?;
        if !canonical.is_dir() {
            return Err(GroveError::NotADirectory {
                path: canonical.display().to_string(),
            });
        }
        Ok(canonical.to_string_lossy().replace('\\', "/"))
    }

    async fn ensure_parent(path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| GroveError::from_io(parent.display().to_string(), e))?;
            }
        }
        Ok(())
    }

    async fn read_optional(path: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GroveError::io(path, e)),
        }
    }

    async fn copy_file_unlogged(source: &str, destination: &str) -> Result<()> {
        Self::ensure_parent(destination).await?;
        tokio::fs::copy(source, destination)
            .await
            .map_err(|e| GroveError::from_io(source, e))?;
        Ok(())
    }

    async fn copy_tree_unlogged(source: &str, destination: &str) -> Result<()> {
        let metadata = tokio::fs::metadata(source)
            .await
            .map_err(|e| GroveError::from_io(source, e))?;
        if !metadata.is_dir() {
            return Self::copy_file_unlogged(source, destination).await;
        }

        let mut pending = vec![(PathBuf::from(source), PathBuf::from(destination))];
        while let Some((from, to)) = pending.pop() {
            tokio::fs::create_dir_all(&to)
                .await
                .map_err(|e| GroveError::from_io(to.display().to_string(), e))?;
            let mut entries = tokio::fs::read_dir(&from)
                .await
                .map_err(|e| GroveError::from_io(from.display().to_string(), e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| GroveError::io(from.display().to_string(), e))?
            {
                let child = entry.path();
                let target = to.join(entry.file_name());
                let is_dir = tokio::fs::metadata(&child)
                    .await
                    .map_err(|e| GroveError::from_io(child.display().to_string(), e))?
                    .is_dir();
                if is_dir {
                    pending.push((child, target));
                } else {
                    tokio::fs::copy(&child, &target)
                        .await
                        .map_err(|e| GroveError::from_io(child.display().to_string(), e))?;
                }
            }
        }
        Ok(())
    }

    async fn rename_or_copy(source: &str, destination: &str, tree: bool) -> Result<()> {
        if tree && Path::new(destination).starts_with(source) {
            return Err(GroveError::io(
                destination,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("cannot move {} into itself", source),
                ),
            ));
        }
        Self::ensure_parent(destination).await?;
        match tokio::fs::rename(source, destination).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(GroveError::NotFound {
                path: source.to_string(),
            }),
            Err(e) => {
                // Renames fail across filesystems; fall back to copy and delete
                tracing::debug!(source, destination, error = %e, "rename failed, copying instead");
                if tree {
                    Self::copy_tree_unlogged(source, destination).await?;
                    tokio::fs::remove_dir_all(source)
                        .await
                        .map_err(|e| GroveError::io(source, e))
                } else {
                    Self::copy_file_unlogged(source, destination).await?;
                    tokio::fs::remove_file(source)
                        .await
                        .map_err(|e| GroveError::io(source, e))
                }
            }
        }
    }
}

struct DiskWalk {
    root: PathBuf,
    iter: walkdir::IntoIter,
}

impl PreorderSource for DiskWalk {
    fn next_entry(&mut self) -> Option<Result<WalkEntry>> {
        let entry = match self.iter.next()? {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .unwrap_or(&self.root)
                    .display()
                    .to_string();
                return Some(Err(GroveError::from_io(path, io::Error::from(e))));
            }
        };

        // Joined per component so a backslash inside a Unix file name survives
        let relative = entry
            .path()
            .strip_prefix(&self.root)
            .unwrap_or_else(|_| entry.path())
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        // Unfollowed symlinks report neither flag
        let file_type = entry.file_type();
        Some(Ok(WalkEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: relative,
            depth: entry.depth(),
            is_file: file_type.is_file(),
            is_directory: file_type.is_dir(),
            is_symlink: entry.path_is_symlink(),
        }))
    }

    fn skip_children(&mut self) {
        self.iter.skip_current_dir();
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn read_text(&self, path: &str) -> Result<Option<String>> {
        self.log.record(OperationKind::Text, path);
        Ok(Self::read_optional(path)
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn read_bytes(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.log.record(OperationKind::Bytes, path);
        Self::read_optional(path).await
    }

    async fn read_json(&self, path: &str) -> Result<Option<serde_json::Value>> {
        self.log.record(OperationKind::Json, path);
        Self::read_optional(path)
            .await?
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|source| GroveError::Json {
                    path: path.to_string(),
                    source,
                })
            })
            .transpose()
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        self.log.record(OperationKind::Write, path);
        Self::ensure_parent(path).await?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| GroveError::io(path, e))
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        self.log.record(OperationKind::CreateDirectory, path);
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| GroveError::io(path, e))
    }

    async fn copy_file(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::CopyFile, source, destination);
        Self::copy_file_unlogged(source, destination).await
    }

    async fn copy_tree(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::CopyTree, source, destination);
        Self::copy_tree_unlogged(source, destination).await
    }

    async fn move_file(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::MoveFile, source, destination);
        Self::rename_or_copy(source, destination, false).await
    }

    async fn move_tree(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::MoveTree, source, destination);
        Self::rename_or_copy(source, destination, true).await
    }

    async fn delete_file(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::DeleteFile, path);
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GroveError::io(path, e)),
        }
    }

    async fn delete_tree(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::DeleteTree, path);
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(GroveError::io(path, e)),
        };
        let removed = if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };
        removed.map(|_| true).map_err(|e| GroveError::io(path, e))
    }

    async fn is_file(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::IsFile, path);
        Ok(tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false))
    }

    async fn is_directory(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::IsDirectory, path);
        Ok(tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false))
    }

    async fn size(&self, path: &str) -> Result<u64> {
        self.log.record(OperationKind::Size, path);
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| GroveError::from_io(path, e))?;
        Ok(if metadata.is_dir() { 0 } else { metadata.len() })
    }

    async fn last_modified(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.log.record(OperationKind::LastModified, path);
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.modified().ok().map(DateTime::<Utc>::from)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GroveError::io(path, e)),
        }
    }

    async fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        self.log.record(OperationKind::List, path);
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| GroveError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Err(GroveError::NotADirectory {
                path: path.to_string(),
            });
        }

        let mut listing = Vec::new();
        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| GroveError::from_io(path, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GroveError::io(path, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| GroveError::io(entry.path().display().to_string(), e))?;
            let is_directory = if file_type.is_symlink() && self.follow_symlinks {
                tokio::fs::metadata(entry.path())
                    .await
                    .map(|metadata| metadata.is_dir())
                    .unwrap_or(false)
            } else {
                file_type.is_dir()
            };
            listing.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_file: !is_directory,
                is_directory,
                is_symlink: file_type.is_symlink(),
            });
        }
        if self.sort_entries {
            listing.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(listing)
    }

    /// Directory reads run synchronously through `walkdir` on the polling
    /// thread, one entry per poll.
    fn walk<'a>(&'a self, path: &str, options: WalkOptions) -> WalkStream<'a> {
        self.log.record(OperationKind::Walk, path);
        let root = PathBuf::from(path);
        match std::fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return failed_walk(GroveError::NotADirectory {
                    path: path.to_string(),
                })
            }
            Err(e) => return failed_walk(GroveError::from_io(path, e)),
        }

        let mut walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(self.follow_symlinks);
        if self.sort_entries {
            walker = walker.sort_by_file_name();
        }
        tracing::trace!(root = %root.display(), "Starting filesystem walk");
        drive_walk(
            DiskWalk {
                root,
                iter: walker.into_iter(),
            },
            options,
        )
    }

    fn log_start(&self, label: &str) {
        self.log.start(label);
    }

    fn log_end(&self, label: &str) -> Vec<LogEntry> {
        self.log.end(label)
    }
}
