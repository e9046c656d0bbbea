//! Depth-first traversal and search over built trees

use crate::tree::node::{DirectoryNode, FileNode, TreeNode};
use std::slice;

/// Lazy pre-order iterator over a node list and all descendants
///
/// Uses an explicit stack of child iterators, so deep trees do not recurse.
/// Each call to [`traverse`] starts a fresh, independent iteration.
pub struct Traverse<'a, C> {
    stack: Vec<slice::Iter<'a, TreeNode<C>>>,
}

impl<'a, C> Iterator for Traverse<'a, C> {
    type Item = &'a TreeNode<C>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(node) => {
                    if let TreeNode::Directory(dir) = node {
                        self.stack.push(dir.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Visit every node in depth-first pre-order: each directory is yielded
/// before its children.
pub fn traverse<C>(nodes: &[TreeNode<C>]) -> Traverse<'_, C> {
    Traverse {
        stack: vec![nodes.iter()],
    }
}

/// First file, in traversal order, satisfying `predicate`.
pub fn find_file<'a, C, P>(nodes: &'a [TreeNode<C>], mut predicate: P) -> Option<&'a FileNode<C>>
where
    P: FnMut(&FileNode<C>) -> bool,
{
    traverse(nodes)
        .filter_map(TreeNode::as_file)
        .find(|file| predicate(file))
}

/// First directory, in traversal order, satisfying `predicate`.
pub fn find_directory<'a, C, P>(
    nodes: &'a [TreeNode<C>],
    mut predicate: P,
) -> Option<&'a DirectoryNode<C>>
where
    P: FnMut(&DirectoryNode<C>) -> bool,
{
    traverse(nodes)
        .filter_map(TreeNode::as_directory)
        .find(|dir| predicate(dir))
}

/// Every file satisfying `predicate`, in traversal order.
pub fn find_all_files<'a, C, P>(nodes: &'a [TreeNode<C>], mut predicate: P) -> Vec<&'a FileNode<C>>
where
    P: FnMut(&FileNode<C>) -> bool,
{
    traverse(nodes)
        .filter_map(TreeNode::as_file)
        .filter(|file| predicate(file))
        .collect()
}

/// Whether any node satisfies `predicate`. Stops at the first match.
pub fn contains_match<C, P>(nodes: &[TreeNode<C>], predicate: P) -> bool
where
    P: FnMut(&TreeNode<C>) -> bool,
{
    traverse(nodes).any(predicate)
}

/// Whether any descendant of `dir` satisfies `predicate`.
pub fn directory_includes<C, P>(dir: &DirectoryNode<C>, predicate: P) -> bool
where
    P: FnMut(&TreeNode<C>) -> bool,
{
    contains_match(&dir.children, predicate)
}
