//! Content materialization
//!
//! Reads file content from a backend in the requested encoding and turns walk
//! entries into fully populated nodes. A file node always starts from its raw
//! text; a [`ContentTransformer`] then maps that node to the content stored in
//! the tree.

use crate::backend::{StorageBackend, WalkEntry};
use crate::error::{GroveError, Result};
use crate::tree::node::{DirectoryNode, FileNode};
use crate::tree::path;
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Encoding requested from a read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// UTF-8 text; invalid sequences are replaced
    #[default]
    Text,
    Json,
    Bytes,
    /// Standard-alphabet base64 of the raw bytes
    Base64,
}

/// Content decoded according to a [`ContentType`]
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    Base64(String),
}

impl Content {
    pub fn content_type(&self) -> ContentType {
        match self {
            Content::Text(_) => ContentType::Text,
            Content::Json(_) => ContentType::Json,
            Content::Bytes(_) => ContentType::Bytes,
            Content::Base64(_) => ContentType::Base64,
        }
    }

    /// Text view for the string-shaped encodings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Content::Text(text) | Content::Base64(text) => Some(text),
            Content::Json(_) | Content::Bytes(_) => None,
        }
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Read `path` in the requested encoding. A missing file yields `Ok(None)`.
pub async fn read(
    backend: &dyn StorageBackend,
    path: &str,
    content_type: ContentType,
) -> Result<Option<Content>> {
    Ok(match content_type {
        ContentType::Text => backend.read_text(path).await?.map(Content::Text),
        ContentType::Json => backend.read_json(path).await?.map(Content::Json),
        ContentType::Bytes => backend.read_bytes(path).await?.map(Content::Bytes),
        ContentType::Base64 => backend
            .read_bytes(path)
            .await?
            .map(|bytes| Content::Base64(encode_base64(&bytes))),
    })
}

/// Maps a file node carrying raw text to the content kept in the tree
#[async_trait]
pub trait ContentTransformer: Send + Sync {
    type Output: Send;

    async fn transform(&self, node: FileNode<String>) -> anyhow::Result<Self::Output>;
}

/// Keeps the raw text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct RawContent;

#[async_trait]
impl ContentTransformer for RawContent {
    type Output = String;

    async fn transform(&self, node: FileNode<String>) -> anyhow::Result<String> {
        Ok(node.content)
    }
}

/// Synchronous closure transformer, see [`transform_fn`]
pub struct TransformFn<F>(pub F);

#[async_trait]
impl<F, O> ContentTransformer for TransformFn<F>
where
    F: Fn(FileNode<String>) -> anyhow::Result<O> + Send + Sync,
    O: Send,
{
    type Output = O;

    async fn transform(&self, node: FileNode<String>) -> anyhow::Result<O> {
        (self.0)(node)
    }
}

pub fn transform_fn<F, O>(f: F) -> TransformFn<F>
where
    F: Fn(FileNode<String>) -> anyhow::Result<O> + Send + Sync,
    O: Send,
{
    TransformFn(f)
}

/// Asynchronous closure transformer, see [`async_transform_fn`]
pub struct AsyncTransformFn<F>(pub F);

#[async_trait]
impl<F, Fut, O> ContentTransformer for AsyncTransformFn<F>
where
    F: Fn(FileNode<String>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    O: Send,
{
    type Output = O;

    async fn transform(&self, node: FileNode<String>) -> anyhow::Result<O> {
        (self.0)(node).await
    }
}

pub fn async_transform_fn<F, Fut, O>(f: F) -> AsyncTransformFn<F>
where
    F: Fn(FileNode<String>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    O: Send,
{
    AsyncTransformFn(f)
}

/// Materialize a file node for a walk entry found at `resolved`.
///
/// The raw text must exist; a backend returning nothing is a
/// [`GroveError::ReadFailure`].
pub(crate) async fn build_file_node<T>(
    backend: &dyn StorageBackend,
    resolved: &str,
    entry: &WalkEntry,
    transformer: &T,
) -> Result<FileNode<T::Output>>
where
    T: ContentTransformer + ?Sized,
{
    let text = backend
        .read_text(resolved)
        .await?
        .ok_or_else(|| GroveError::ReadFailure {
            path: resolved.to_string(),
        })?;
    let modified = backend.last_modified(resolved).await?;
    let size = backend.size(resolved).await?;
    let (_, ext) = path::split_extension(&entry.name);

    let attributes = FileNode {
        name: entry.name.clone(),
        path: entry.path.clone(),
        depth: entry.depth,
        modified,
        base: entry.name.clone(),
        ext: ext.to_string(),
        size,
        is_symlink: entry.is_symlink,
        content: (),
    };
    let content = transformer
        .transform(attributes.clone().with_content(text))
        .await
        .map_err(|source| GroveError::Transform {
            path: resolved.to_string(),
            source,
        })?;
    Ok(attributes.with_content(content))
}

/// Directory node for a walk entry found at `resolved`, without children.
pub(crate) async fn build_directory_node<C>(
    backend: &dyn StorageBackend,
    resolved: &str,
    entry: &WalkEntry,
) -> Result<DirectoryNode<C>> {
    let mut node = DirectoryNode::new(entry.name.clone(), entry.path.clone(), entry.depth);
    node.modified = backend.last_modified(resolved).await?;
    Ok(node)
}
