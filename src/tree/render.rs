//! ASCII rendering and summary statistics for built trees

use crate::tree::node::TreeNode;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

const BRANCH: &str = "├── ";
const LAST: &str = "└── ";
const VERTICAL: &str = "│   ";
const SPACE: &str = "    ";

/// Rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Show file extensions (default: true)
    pub extensions: bool,
    /// Append the modification date when known
    pub show_dates: bool,
    /// Prepended to every line
    pub prefix: String,
    /// Levels to render; `None` renders everything
    pub max_depth: Option<usize>,
    /// Also log [`TreeStats`] from [`log_tree`]
    pub stats: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            extensions: true,
            show_dates: false,
            prefix: String::new(),
            max_depth: None,
            stats: false,
        }
    }
}

fn label<C>(node: &TreeNode<C>, options: &RenderOptions) -> String {
    let mut label = match node {
        TreeNode::Directory(dir) => format!("{}/", dir.name),
        TreeNode::File(file) if options.extensions => file.base.clone(),
        TreeNode::File(file) => file
            .base
            .strip_suffix(file.ext.as_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(&file.base)
            .to_string(),
    };
    if options.show_dates {
        if let Some(modified) = node.modified() {
            label.push_str(&format!(" ({})", modified.format("%Y-%m-%d")));
        }
    }
    label
}

fn render_level<C>(
    nodes: &[TreeNode<C>],
    indent: &str,
    level: usize,
    options: &RenderOptions,
    lines: &mut Vec<String>,
) {
    if options.max_depth.is_some_and(|max| level >= max) {
        return;
    }
    for (index, node) in nodes.iter().enumerate() {
        let is_last = index + 1 == nodes.len();
        lines.push(format!(
            "{}{}{}{}",
            options.prefix,
            indent,
            if is_last { LAST } else { BRANCH },
            label(node, options)
        ));
        if let TreeNode::Directory(dir) = node {
            if !dir.children.is_empty() {
                let next = format!("{}{}", indent, if is_last { SPACE } else { VERTICAL });
                render_level(&dir.children, &next, level + 1, options, lines);
            }
        }
    }
}

/// Render nodes as an ASCII tree, one line per node.
pub fn render_tree<C>(nodes: &[TreeNode<C>], options: &RenderOptions) -> String {
    let mut lines = Vec::new();
    render_level(nodes, "", 0, options, &mut lines);
    lines.join("\n")
}

/// Summary counts over a node list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub directory_count: usize,
    pub file_count: usize,
    /// Deepest level containing nodes, counting the given list as 0
    pub max_depth: usize,
    pub extensions: BTreeSet<String>,
}

pub fn tree_stats<C>(nodes: &[TreeNode<C>]) -> TreeStats {
    let mut stats = TreeStats::default();
    let mut pending = vec![(nodes, 0usize)];
    while let Some((level_nodes, level)) = pending.pop() {
        stats.max_depth = stats.max_depth.max(level);
        for node in level_nodes {
            match node {
                TreeNode::Directory(dir) => {
                    stats.directory_count += 1;
                    if !dir.children.is_empty() {
                        pending.push((dir.children.as_slice(), level + 1));
                    }
                }
                TreeNode::File(file) => {
                    stats.file_count += 1;
                    if !file.ext.is_empty() {
                        stats.extensions.insert(file.ext.clone());
                    }
                }
            }
        }
    }
    stats
}

/// Emit the rendered tree (and optionally its stats) at `info` level.
pub fn log_tree<C>(nodes: &[TreeNode<C>], options: &RenderOptions) {
    info!("\n{}", render_tree(nodes, options));
    if options.stats {
        let stats = tree_stats(nodes);
        let mut extensions = stats.extensions.iter().cloned().collect::<Vec<_>>().join(", ");
        if extensions.is_empty() {
            extensions = "none".to_string();
        }
        info!(
            directories = stats.directory_count,
            files = stats.file_count,
            max_depth = stats.max_depth,
            extensions = %extensions,
            "Tree stats"
        );
    }
}
