//! Grove: directory trees over pluggable storage
//!
//! Walks a storage backend (local disk, memory, or anything implementing
//! [`StorageBackend`]) into a tree of typed file and directory nodes, with
//! `.gitignore`-style or custom filtering and optional content transforms.
//! The inverse operation, hydration, writes a declared tree back to storage.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod tree;

pub use api::Grove;
pub use backend::{LocalBackend, MemoryBackend, StorageBackend, WalkEntry, WalkOptions};
pub use config::{ConfigLoader, GroveConfig};
pub use error::{GroveError, Result};
pub use tree::content::{Content, ContentTransformer, ContentType, RawContent};
pub use tree::filter::{CompiledFilter, Filter};
pub use tree::hydrate::{HydrateInput, HydrateSummary};
pub use tree::node::{DirectoryNode, FileNode, TreeEntry, TreeNode, TreeStructure};
