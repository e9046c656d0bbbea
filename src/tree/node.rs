//! Tree node types and the declarative tree description used for hydration

use crate::error::{GroveError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// File node representation
///
/// `content` is always populated before the node is attached to a tree. Its
/// type is the output of the content transformer used for the build
/// (`String` when the raw text is kept).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode<C = String> {
    /// Final path segment
    pub name: String,
    /// Position relative to the walk root, `/`-separated, no leading separator
    pub path: String,
    /// Root's direct children have depth 1
    pub depth: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Filename with extension
    pub base: String,
    /// Extension including the leading dot, empty when there is none
    pub ext: String,
    pub size: u64,
    pub is_symlink: bool,
    pub content: C,
}

impl<C> FileNode<C> {
    /// Replace the content, keeping every other attribute.
    pub fn with_content<D>(self, content: D) -> FileNode<D> {
        FileNode {
            name: self.name,
            path: self.path,
            depth: self.depth,
            modified: self.modified,
            base: self.base,
            ext: self.ext,
            size: self.size,
            is_symlink: self.is_symlink,
            content,
        }
    }
}

/// Directory node representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryNode<C = String> {
    pub name: String,
    pub path: String,
    pub depth: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Children in the order the walk observed them
    #[serde(default = "Vec::new")]
    pub children: Vec<TreeNode<C>>,
}

impl<C> DirectoryNode<C> {
    /// Create an empty directory node.
    pub fn new(name: impl Into<String>, path: impl Into<String>, depth: usize) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            depth,
            modified: None,
            children: Vec::new(),
        }
    }

    /// Depth-first pre-order iteration over every descendant.
    pub fn descendants(&self) -> crate::tree::traverse::Traverse<'_, C> {
        crate::tree::traverse::traverse(&self.children)
    }
}

impl DirectoryNode<String> {
    /// Convert a tree built with raw text content back into its declarative form.
    pub fn to_structure(&self) -> TreeStructure {
        self.children
            .iter()
            .map(|child| match child {
                TreeNode::File(file) => (file.name.clone(), TreeEntry::File(file.content.clone())),
                TreeNode::Directory(dir) => {
                    (dir.name.clone(), TreeEntry::Directory(dir.to_structure()))
                }
            })
            .collect()
    }
}

/// Tree node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode<C = String> {
    File(FileNode<C>),
    Directory(DirectoryNode<C>),
}

impl<C> TreeNode<C> {
    /// Type tag as it appears in serialized output
    pub fn kind(&self) -> &'static str {
        match self {
            TreeNode::File(_) => "file",
            TreeNode::Directory(_) => "directory",
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, TreeNode::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory(_))
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(file) => &file.name,
            TreeNode::Directory(dir) => &dir.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::File(file) => &file.path,
            TreeNode::Directory(dir) => &dir.path,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::File(file) => file.depth,
            TreeNode::Directory(dir) => dir.depth,
        }
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        match self {
            TreeNode::File(file) => file.modified,
            TreeNode::Directory(dir) => dir.modified,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode<C>> {
        match self {
            TreeNode::File(file) => Some(file),
            TreeNode::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode<C>> {
        match self {
            TreeNode::Directory(dir) => Some(dir),
            TreeNode::File(_) => None,
        }
    }

    /// Assert that this node is a file.
    pub fn expect_file(&self) -> Result<&FileNode<C>> {
        self.as_file().ok_or_else(|| self.assertion_error("file"))
    }

    /// Assert that this node is a directory.
    pub fn expect_directory(&self) -> Result<&DirectoryNode<C>> {
        self.as_directory()
            .ok_or_else(|| self.assertion_error("directory"))
    }

    pub fn into_file(self) -> Result<FileNode<C>> {
        match self {
            TreeNode::File(file) => Ok(file),
            other => Err(other.assertion_error("file")),
        }
    }

    pub fn into_directory(self) -> Result<DirectoryNode<C>> {
        match self {
            TreeNode::Directory(dir) => Ok(dir),
            other => Err(other.assertion_error("directory")),
        }
    }

    fn assertion_error(&self, expected: &'static str) -> GroveError {
        GroveError::InvalidNodeAssertion {
            expected,
            actual: self.kind(),
            path: self.path().to_string(),
        }
    }
}

impl<C> From<FileNode<C>> for TreeNode<C> {
    fn from(file: FileNode<C>) -> Self {
        TreeNode::File(file)
    }
}

impl<C> From<DirectoryNode<C>> for TreeNode<C> {
    fn from(dir: DirectoryNode<C>) -> Self {
        TreeNode::Directory(dir)
    }
}

/// One entry of a [`TreeStructure`]
///
/// Serializes as a plain string (file content) or a nested object (directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeEntry {
    File(String),
    Directory(TreeStructure),
}

/// Declarative description of a directory tree
///
/// Keys are entry names, kept in declaration order; hydration visits them in
/// that order. Equality ignores order. An empty nested structure is an empty
/// directory that still gets created on hydration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeStructure(IndexMap<String, TreeEntry>);

impl TreeStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style file insertion. Re-inserting a name keeps its position.
    pub fn file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.0.insert(name.into(), TreeEntry::File(content.into()));
        self
    }

    /// Builder-style directory insertion.
    pub fn dir(mut self, name: impl Into<String>, contents: TreeStructure) -> Self {
        self.0.insert(name.into(), TreeEntry::Directory(contents));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: TreeEntry) -> Option<TreeEntry> {
        self.0.insert(name.into(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&String, &TreeEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a JSON value of the form `{ "name": "content" | { ... } }`.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| GroveError::Json {
            path: "<tree structure>".to_string(),
            source,
        })
    }
}

impl FromIterator<(String, TreeEntry)> for TreeStructure {
    fn from_iter<I: IntoIterator<Item = (String, TreeEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
