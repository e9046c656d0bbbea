//! Hydration: writing a declared or previously built tree to a backend
//!
//! Work is processed depth-first with an explicit stack. A directory is
//! always created before anything inside it is written, and entries are
//! visited in their declared order. The first failure aborts the run;
//! whatever was written up to that point stays in place.

use crate::backend::StorageBackend;
use crate::error::{GroveError, Result};
use crate::tree::node::{DirectoryNode, TreeEntry, TreeNode, TreeStructure};
use crate::tree::path;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument, trace};

/// What to hydrate
#[derive(Debug, Clone, Copy)]
pub enum HydrateInput<'a> {
    /// Declarative description; keys are names relative to the target
    Structure(&'a TreeStructure),
    /// Built tree; each child's `path` is joined onto the target
    Tree(&'a DirectoryNode<String>),
}

impl<'a> From<&'a TreeStructure> for HydrateInput<'a> {
    fn from(structure: &'a TreeStructure) -> Self {
        HydrateInput::Structure(structure)
    }
}

impl<'a> From<&'a DirectoryNode<String>> for HydrateInput<'a> {
    fn from(tree: &'a DirectoryNode<String>) -> Self {
        HydrateInput::Tree(tree)
    }
}

/// Counts reported by a finished hydration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HydrateSummary {
    pub files_written: usize,
    pub directories_created: usize,
}

enum Task<'a> {
    File {
        target: String,
        content: &'a str,
    },
    StructureDirectory {
        target: String,
        contents: &'a TreeStructure,
    },
    TreeDirectory {
        target: String,
        children: &'a [TreeNode<String>],
    },
}

/// Writes trees into one backend
pub struct Hydrator<'a> {
    backend: &'a dyn StorageBackend,
}

impl<'a> Hydrator<'a> {
    pub fn new(backend: &'a dyn StorageBackend) -> Self {
        Self { backend }
    }

    /// Hydrate `input` under `target_base`.
    #[instrument(skip(self, input), fields(target = %target_base))]
    pub async fn hydrate(&self, input: HydrateInput<'_>, target_base: &str) -> Result<HydrateSummary> {
        let start = Instant::now();
        let mut summary = HydrateSummary::default();
        let mut stack = Vec::new();
        match input {
            HydrateInput::Structure(structure) => push_structure(&mut stack, target_base, structure),
            HydrateInput::Tree(tree) => push_tree(&mut stack, target_base, &tree.children),
        }

        while let Some(task) = stack.pop() {
            match task {
                Task::File { target, content } => {
                    trace!(path = %target, bytes = content.len(), "Writing file");
                    self.backend
                        .write(&target, content.as_bytes())
                        .await
                        .map_err(|e| GroveError::write(target.clone(), e))?;
                    summary.files_written += 1;
                }
                Task::StructureDirectory { target, contents } => {
                    self.create_directory(&target).await?;
                    summary.directories_created += 1;
                    push_structure(&mut stack, &target, contents);
                }
                Task::TreeDirectory { target, children } => {
                    self.create_directory(&target).await?;
                    summary.directories_created += 1;
                    push_tree(&mut stack, target_base, children);
                }
            }
        }

        info!(
            files_written = summary.files_written,
            directories_created = summary.directories_created,
            duration_ms = start.elapsed().as_millis(),
            "Hydration completed"
        );
        Ok(summary)
    }

    async fn create_directory(&self, target: &str) -> Result<()> {
        trace!(path = %target, "Creating directory");
        self.backend
            .create_directory(target)
            .await
            .map_err(|e| GroveError::directory_create(target, e))
    }
}

/// Push entries in reverse so they pop in declared order.
fn push_structure<'a>(stack: &mut Vec<Task<'a>>, parent: &str, structure: &'a TreeStructure) {
    for (name, entry) in structure.iter().rev() {
        let target = path::join(parent, name);
        stack.push(match entry {
            TreeEntry::File(content) => Task::File { target, content },
            TreeEntry::Directory(contents) => Task::StructureDirectory { target, contents },
        });
    }
}

/// Built node paths are appended verbatim so backend-reported names survive.
fn push_tree<'a>(stack: &mut Vec<Task<'a>>, target_base: &str, children: &'a [TreeNode<String>]) {
    for child in children.iter().rev() {
        let target = path::append(target_base, child.path());
        stack.push(match child {
            TreeNode::File(file) => Task::File {
                target,
                content: &file.content,
            },
            TreeNode::Directory(dir) => Task::TreeDirectory {
                target,
                children: &dir.children,
            },
        });
    }
}
