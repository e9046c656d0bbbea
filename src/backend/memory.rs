//! In-memory storage backend
//!
//! Entries live in a nested map rooted at `/`. Relative paths are taken
//! relative to that root, so `.` and `/` name the same directory. Directory
//! listings and walks are ordered by entry name.

use super::oplog::{LogEntry, OperationKind, OperationLog};
use super::{drive_walk, failed_walk, DirEntry, PreorderSource, StorageBackend, WalkEntry, WalkOptions, WalkStream};
use crate::error::{GroveError, Result};
use crate::tree::path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io;

#[derive(Debug, Clone)]
enum MemNode {
    File {
        bytes: Vec<u8>,
        modified: DateTime<Utc>,
    },
    Directory {
        children: BTreeMap<String, MemNode>,
        modified: DateTime<Utc>,
    },
}

impl MemNode {
    fn empty_directory() -> Self {
        MemNode::Directory {
            children: BTreeMap::new(),
            modified: Utc::now(),
        }
    }

    fn modified(&self) -> DateTime<Utc> {
        match self {
            MemNode::File { modified, .. } | MemNode::Directory { modified, .. } => *modified,
        }
    }
}

fn segments(path: &str) -> Vec<String> {
    path::normalize(path)
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(str::to_string)
        .collect()
}

fn is_a_directory(path: &str) -> GroveError {
    GroveError::io(
        path,
        io::Error::new(io::ErrorKind::Other, "is a directory"),
    )
}

fn lookup<'a>(root: &'a MemNode, segments: &[String]) -> Option<&'a MemNode> {
    segments.iter().try_fold(root, |node, segment| match node {
        MemNode::Directory { children, .. } => children.get(segment),
        MemNode::File { .. } => None,
    })
}

/// Descend to the directory at `segments`, creating missing directories.
fn ensure_directory<'a>(
    root: &'a mut MemNode,
    segments: &[String],
    path: &str,
) -> Result<&'a mut BTreeMap<String, MemNode>> {
    let mut node = root;
    for segment in segments {
        node = match node {
            MemNode::Directory { children, .. } => children
                .entry(segment.clone())
                .or_insert_with(MemNode::empty_directory),
            MemNode::File { .. } => {
                return Err(GroveError::NotADirectory {
                    path: path.to_string(),
                })
            }
        };
    }
    match node {
        MemNode::Directory { children, .. } => Ok(children),
        MemNode::File { .. } => Err(GroveError::NotADirectory {
            path: path.to_string(),
        }),
    }
}

fn remove(root: &mut MemNode, segments: &[String]) -> Option<MemNode> {
    let (name, parents) = segments.split_last()?;
    let mut node = root;
    for segment in parents {
        node = match node {
            MemNode::Directory { children, .. } => children.get_mut(segment)?,
            MemNode::File { .. } => return None,
        };
    }
    match node {
        MemNode::Directory { children, .. } => children.remove(name),
        MemNode::File { .. } => None,
    }
}

/// Place `node` at `segments`, creating parents and replacing what was there.
fn insert(root: &mut MemNode, segments: &[String], node: MemNode, path: &str) -> Result<()> {
    let Some((name, parents)) = segments.split_last() else {
        return Err(is_a_directory(path));
    };
    let children = ensure_directory(root, parents, path)?;
    if matches!(node, MemNode::File { .. })
        && matches!(children.get(name), Some(MemNode::Directory { .. }))
    {
        return Err(is_a_directory(path));
    }
    children.insert(name.clone(), node);
    Ok(())
}

/// Pre-order snapshot of a directory taken when a walk starts
struct SnapshotWalk {
    entries: Vec<WalkEntry>,
    /// Number of descendants following each entry
    spans: Vec<usize>,
    cursor: usize,
    last: Option<usize>,
}

impl SnapshotWalk {
    fn new(children: &BTreeMap<String, MemNode>) -> Self {
        let mut walk = SnapshotWalk {
            entries: Vec::new(),
            spans: Vec::new(),
            cursor: 0,
            last: None,
        };
        walk.flatten(children, "", 1);
        walk
    }

    fn flatten(&mut self, children: &BTreeMap<String, MemNode>, prefix: &str, depth: usize) {
        for (name, node) in children {
            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            let index = self.entries.len();
            let is_file = matches!(node, MemNode::File { .. });
            self.entries.push(WalkEntry {
                path: relative.clone(),
                name: name.clone(),
                depth,
                is_file,
                is_directory: !is_file,
                is_symlink: false,
            });
            self.spans.push(0);
            if let MemNode::Directory { children, .. } = node {
                self.flatten(children, &relative, depth + 1);
                self.spans[index] = self.entries.len() - index - 1;
            }
        }
    }
}

impl PreorderSource for SnapshotWalk {
    fn next_entry(&mut self) -> Option<Result<WalkEntry>> {
        let entry = self.entries.get(self.cursor)?.clone();
        self.last = Some(self.cursor);
        self.cursor += 1;
        Some(Ok(entry))
    }

    fn skip_children(&mut self) {
        if let Some(last) = self.last {
            self.cursor = last + 1 + self.spans[last];
        }
    }
}

/// In-memory storage backend
#[derive(Debug)]
pub struct MemoryBackend {
    root: RwLock<MemNode>,
    log: OperationLog,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(MemNode::empty_directory()),
            log: OperationLog::new(),
        }
    }

    fn bytes_at(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let root = self.root.read();
        match lookup(&root, &segments(path)) {
            Some(MemNode::File { bytes, .. }) => Ok(Some(bytes.clone())),
            Some(MemNode::Directory { .. }) => Err(is_a_directory(path)),
            None => Ok(None),
        }
    }

    fn transfer(&self, source: &str, destination: &str, keep_source: bool, files_only: bool) -> Result<()> {
        let source_segments = segments(source);
        let destination_segments = segments(destination);
        if !keep_source && destination_segments.starts_with(&source_segments) {
            return Err(GroveError::io(
                destination,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("cannot move {} into itself", source),
                ),
            ));
        }

        let mut root = self.root.write();
        let node = match lookup(&root, &source_segments) {
            Some(node @ MemNode::File { .. }) => node.clone(),
            Some(MemNode::Directory { .. }) if files_only => return Err(is_a_directory(source)),
            Some(node) => node.clone(),
            None => {
                return Err(GroveError::NotFound {
                    path: source.to_string(),
                })
            }
        };
        insert(&mut root, &destination_segments, node, destination)?;
        if !keep_source {
            remove(&mut root, &source_segments);
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read_text(&self, path: &str) -> Result<Option<String>> {
        self.log.record(OperationKind::Text, path);
        Ok(self
            .bytes_at(path)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn read_bytes(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.log.record(OperationKind::Bytes, path);
        self.bytes_at(path)
    }

    async fn read_json(&self, path: &str) -> Result<Option<serde_json::Value>> {
        self.log.record(OperationKind::Json, path);
        self.bytes_at(path)?
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
        let mut root = self.root.write();
        insert(
            &mut root,
            &segments(path),
            MemNode::File {
                bytes: contents.to_vec(),
                modified: Utc::now(),
            },
            path,
        )
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        self.log.record(OperationKind::CreateDirectory, path);
        let mut root = self.root.write();
        ensure_directory(&mut root, &segments(path), path).map(|_| ())
    }

    async fn copy_file(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::CopyFile, source, destination);
        self.transfer(source, destination, true, true)
    }

    async fn copy_tree(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::CopyTree, source, destination);
        self.transfer(source, destination, true, false)
    }

    async fn move_file(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::MoveFile, source, destination);
        self.transfer(source, destination, false, true)
    }

    async fn move_tree(&self, source: &str, destination: &str) -> Result<()> {
        self.log
            .record_transfer(OperationKind::MoveTree, source, destination);
        self.transfer(source, destination, false, false)
    }

    async fn delete_file(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::DeleteFile, path);
        let segments = segments(path);
        let mut root = self.root.write();
        let is_file = match lookup(&root, &segments) {
            Some(MemNode::Directory { .. }) => return Err(is_a_directory(path)),
            Some(MemNode::File { .. }) => true,
            None => false,
        };
        Ok(is_file && remove(&mut root, &segments).is_some())
    }

    async fn delete_tree(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::DeleteTree, path);
        let segments = segments(path);
        let mut root = self.root.write();
        if segments.is_empty() {
            *root = MemNode::empty_directory();
            return Ok(true);
        }
        Ok(remove(&mut root, &segments).is_some())
    }

    async fn is_file(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::IsFile, path);
        let root = self.root.read();
        Ok(matches!(
            lookup(&root, &segments(path)),
            Some(MemNode::File { .. })
        ))
    }

    async fn is_directory(&self, path: &str) -> Result<bool> {
        self.log.record(OperationKind::IsDirectory, path);
        let root = self.root.read();
        Ok(matches!(
            lookup(&root, &segments(path)),
            Some(MemNode::Directory { .. })
        ))
    }

    async fn size(&self, path: &str) -> Result<u64> {
        self.log.record(OperationKind::Size, path);
        let root = self.root.read();
        match lookup(&root, &segments(path)) {
            Some(MemNode::File { bytes, .. }) => Ok(bytes.len() as u64),
            Some(MemNode::Directory { .. }) => Ok(0),
            None => Err(GroveError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn last_modified(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        self.log.record(OperationKind::LastModified, path);
        let root = self.root.read();
        Ok(lookup(&root, &segments(path)).map(MemNode::modified))
    }

    async fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        self.log.record(OperationKind::List, path);
        let root = self.root.read();
        match lookup(&root, &segments(path)) {
            Some(MemNode::Directory { children, .. }) => Ok(children
                .iter()
                .map(|(name, node)| {
                    let is_file = matches!(node, MemNode::File { .. });
                    DirEntry {
                        name: name.clone(),
                        is_file,
                        is_directory: !is_file,
                        is_symlink: false,
                    }
                })
                .collect()),
            Some(MemNode::File { .. }) => Err(GroveError::NotADirectory {
                path: path.to_string(),
            }),
            None => Err(GroveError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    fn walk<'a>(&'a self, path: &str, options: WalkOptions) -> WalkStream<'a> {
        self.log.record(OperationKind::Walk, path);
        let snapshot = {
            let root = self.root.read();
            match lookup(&root, &segments(path)) {
                Some(MemNode::Directory { children, .. }) => Ok(SnapshotWalk::new(children)),
                Some(MemNode::File { .. }) => Err(GroveError::NotADirectory {
                    path: path.to_string(),
                }),
                None => Err(GroveError::NotFound {
                    path: path.to_string(),
                }),
            }
        };
        match snapshot {
            Ok(source) => drive_walk(source, options),
            Err(error) => failed_walk(error),
        }
    }

    fn log_start(&self, label: &str) {
        self.log.start(label);
    }

    fn log_end(&self, label: &str) -> Vec<LogEntry> {
        self.log.end(label)
    }
}
