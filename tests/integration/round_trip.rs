//! Integration tests for hydrate-then-build round trips

use super::test_utils::project_structure;
use grove::{Grove, LocalBackend, MemoryBackend, RawContent, TreeStructure};
use tempfile::TempDir;

/// Test that building a hydrated structure gives the structure back
#[tokio::test]
async fn test_memory_round_trip() {
    let grove = Grove::with_root(MemoryBackend::new(), "/work");
    let structure = project_structure();

    grove.hydrate(&structure, None).await.unwrap();
    let tree = grove.tree_with(None, None, &RawContent).await.unwrap();

    assert_eq!(tree.to_structure(), structure);
}

/// Test the same round trip against the local filesystem
#[tokio::test]
async fn test_local_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let root = LocalBackend::canonical_root(temp_dir.path()).unwrap();
    let grove = Grove::with_root(LocalBackend::new(), root);
    let structure = project_structure();

    grove.hydrate(&structure, None).await.unwrap();
    let tree = grove.tree(None, None).await.unwrap();

    assert_eq!(tree.to_structure(), structure);
}

/// Test that a deep chain survives the round trip
#[tokio::test]
async fn test_deep_round_trip() {
    let mut structure = TreeStructure::new().file("leaf.txt", "leaf");
    for level in (0..20).rev() {
        structure = TreeStructure::new().dir(format!("level{level}"), structure);
    }
    let grove = Grove::with_root(MemoryBackend::new(), "/deep");

    grove.hydrate(&structure, None).await.unwrap();
    let tree = grove.tree(None, None).await.unwrap();

    assert_eq!(tree.to_structure(), structure);
    let leaf = tree
        .descendants()
        .find(|node| node.name() == "leaf.txt")
        .unwrap();
    assert_eq!(leaf.depth(), 21);
}
