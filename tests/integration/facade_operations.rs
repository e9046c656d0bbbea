//! Integration tests for facade path resolution and file operations

use super::test_utils::memory_project;
use futures::TryStreamExt;
use grove::tree::content::{async_transform_fn, transform_fn};
use grove::tree::render::{render_tree, tree_stats, RenderOptions};
use grove::{FileNode, Grove, GroveError, MemoryBackend};

/// Test that relative, absolute, and absent paths resolve against the root
#[tokio::test]
async fn test_path_resolution() {
    let grove = Grove::with_root(MemoryBackend::new(), "/base");

    assert_eq!(grove.resolve_path(None), "/base");
    assert_eq!(grove.resolve_path(Some("a/b")), "/base/a/b");
    assert_eq!(grove.resolve_path(Some("/elsewhere")), "/elsewhere");
    assert_eq!(grove.resolve_path(Some("a/../c")), "/base/c");
    assert_eq!(Grove::new(MemoryBackend::new()).root(), ".");
    assert_eq!(Grove::new(MemoryBackend::new()).resolve_path(Some("a/b")), "a/b");
}

/// Test that the root node is named after the walked directory
#[tokio::test]
async fn test_root_node_naming() {
    let grove = memory_project().await;

    let tree = grove.tree(None, None).await.unwrap();
    assert_eq!(tree.name, "proj");
    assert_eq!(tree.path, "proj");
    assert_eq!(tree.depth, 0);

    let whole = Grove::from_shared(std::sync::Arc::new(MemoryBackend::new()), "/");
    whole.write("/only.txt", "x").await.unwrap();
    let tree = whole.tree(None, None).await.unwrap();
    assert_eq!(tree.name, "/");
    assert_eq!(tree.children.len(), 1);
}

/// Test a synchronous transformer over every file
#[tokio::test]
async fn test_tree_with_transformer() {
    let grove = memory_project().await;
    let lengths = transform_fn(|file: FileNode| Ok(file.content.len()));

    let tree = grove.tree_with(Some("src"), None, &lengths).await.unwrap();
    let math = tree
        .descendants()
        .find_map(|node| node.as_file().filter(|file| file.name == "math.ts"))
        .unwrap();

    assert_eq!(math.content, math.size as usize);
}

/// Test that looking up a file below a missing directory finds nothing
#[tokio::test]
async fn test_file_with_missing_parent() {
    let grove = memory_project().await;

    assert!(grove.file("nope/x.ts").await.unwrap().is_none());
    assert!(grove.file("src/utils/math.ts").await.unwrap().is_some());
}

/// Test that transformer failures name the file
#[tokio::test]
async fn test_transformer_failure() {
    let grove = memory_project().await;
    let parse = async_transform_fn(|file: FileNode| async move {
        serde_json::from_str::<serde_json::Value>(&file.content).map_err(anyhow::Error::from)
    });

    let err = grove.tree_with(None, None, &parse).await.unwrap_err();

    assert!(matches!(err, GroveError::Transform { .. }));
}

/// Test streaming files with a transformer
#[tokio::test]
async fn test_files_with_transformer() {
    let grove = memory_project().await;
    let upper = transform_fn(|file: FileNode| Ok(file.content.to_uppercase()));

    let files: Vec<_> = grove
        .files_with(Some("src/utils"), None, &upper)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].content, "EXPORT CONST ADD = (A, B) => A + B");
}

/// Test listing and deleting through the facade
#[tokio::test]
async fn test_list_and_delete() {
    let grove = memory_project().await;

    let names: Vec<_> = grove
        .list(Some("src"))
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, vec!["index.test.ts", "index.ts", "utils"]);

    assert!(grove.delete("src/utils").await.unwrap());
    assert!(grove.delete("README.md").await.unwrap());
    assert!(!grove.delete("README.md").await.unwrap());
    assert_eq!(grove.read_text("src/utils/math.ts").await.unwrap(), None);
}

/// Test rendering and counting a built tree
#[tokio::test]
async fn test_render_and_stats() {
    let grove = memory_project().await;
    let nodes = grove.directory(Some("src"), None).await.unwrap();

    let stats = tree_stats(&nodes);
    assert_eq!(stats.file_count, 3);
    assert_eq!(stats.directory_count, 1);

    let rendered = render_tree(&nodes, &RenderOptions::default());
    assert!(rendered.contains("utils"));
    assert!(rendered.contains("math.ts"));
}
