//! Integration tests for writing trees into a backend

use super::test_utils::memory_project;
use grove::backend::OperationKind;
use grove::{Grove, GroveError, MemoryBackend, StorageBackend, TreeStructure};

fn operations(entries: &[grove::backend::LogEntry]) -> Vec<(OperationKind, String)> {
    entries
        .iter()
        .filter(|entry| {
            matches!(
                entry.kind,
                OperationKind::Write | OperationKind::CreateDirectory
            )
        })
        .map(|entry| (entry.kind, entry.path.clone()))
        .collect()
}

/// Test that hydration creates each directory before writing below it
#[tokio::test]
async fn test_directory_created_before_its_files() {
    let grove = Grove::with_root(MemoryBackend::new(), "/proj");
    let structure = TreeStructure::new()
        .dir("src", TreeStructure::new().file("index.ts", "x"))
        .file("README.md", "# hi");

    grove.log_start("hydrate");
    let summary = grove.hydrate(&structure, None).await.unwrap();
    let log = grove.log_end("hydrate");

    assert_eq!(summary.files_written, 2);
    assert_eq!(summary.directories_created, 1);

    assert_eq!(
        operations(&log),
        vec![
            (OperationKind::CreateDirectory, "/proj/src".to_string()),
            (OperationKind::Write, "/proj/src/index.ts".to_string()),
            (OperationKind::Write, "/proj/README.md".to_string()),
        ]
    );
    assert_eq!(grove.read_text("src/index.ts").await.unwrap().as_deref(), Some("x"));
    assert_eq!(grove.read_text("README.md").await.unwrap().as_deref(), Some("# hi"));
}

/// Test that a JSON description is hydrated in the order it was written
#[tokio::test]
async fn test_json_structure_keeps_declared_order() {
    let structure = TreeStructure::from_json(serde_json::json!({
        "src": { "index.ts": "export {}" },
        "README.md": "# hi"
    }))
    .unwrap();
    let grove = Grove::with_root(MemoryBackend::new(), "/proj");

    grove.log_start("json");
    grove.hydrate(&structure, None).await.unwrap();
    let log = grove.log_end("json");

    let paths: Vec<_> = operations(&log).into_iter().map(|(_, path)| path).collect();
    assert_eq!(paths, vec!["/proj/src", "/proj/src/index.ts", "/proj/README.md"]);
}

/// Test that an empty mapping still creates its directory
#[tokio::test]
async fn test_empty_directory_is_created() {
    let grove = memory_project().await;
    assert!(grove.backend().is_directory("/proj/empty").await.unwrap());
    assert!(grove.list(Some("empty")).await.unwrap().is_empty());
}

/// Test hydrating under an explicit relative target
#[tokio::test]
async fn test_hydrate_into_relative_target() {
    let grove = memory_project().await;
    let summary = grove
        .hydrate(&TreeStructure::new().file("a.txt", "a"), Some("out/nested"))
        .await
        .unwrap();

    assert_eq!(summary.files_written, 1);
    assert_eq!(
        grove.read_text("/proj/out/nested/a.txt").await.unwrap().as_deref(),
        Some("a")
    );
}

/// Test that a built tree can be written to another location
#[tokio::test]
async fn test_hydrate_built_tree_elsewhere() {
    let grove = memory_project().await;
    let tree = grove.tree(Some("src"), None).await.unwrap();

    grove.hydrate(&tree, Some("/copy")).await.unwrap();

    assert_eq!(
        grove.read_text("/copy/utils/math.ts").await.unwrap(),
        grove.read_text("src/utils/math.ts").await.unwrap()
    );
    let copied = grove.tree(Some("/copy"), None).await.unwrap();
    assert_eq!(copied.to_structure(), tree.to_structure());
}

/// Test that writing a file below an existing file surfaces a write error
#[tokio::test]
async fn test_hydrate_below_file_fails() {
    let grove = memory_project().await;
    let err = grove
        .hydrate(&TreeStructure::new().file("x.txt", "x"), Some("README.md"))
        .await
        .unwrap_err();

    assert!(matches!(err, GroveError::Write { ref path, .. } if path == "/proj/README.md/x.txt"));
}

/// Test that a structure can be described in JSON
#[tokio::test]
async fn test_hydrate_from_json_structure() {
    let structure = TreeStructure::from_json(serde_json::json!({
        "docs": { "guide.md": "guide" },
        "LICENSE": "MIT"
    }))
    .unwrap();
    let grove = Grove::with_root(MemoryBackend::new(), "/repo");

    grove.hydrate(&structure, None).await.unwrap();

    assert_eq!(grove.read_text("docs/guide.md").await.unwrap().as_deref(), Some("guide"));
    assert_eq!(grove.read_text("LICENSE").await.unwrap().as_deref(), Some("MIT"));
}
