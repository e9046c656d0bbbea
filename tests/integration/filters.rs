//! Integration tests for filters applied through the facade

use super::test_utils::memory_project;
use futures::TryStreamExt;
use grove::{Filter, Grove, GroveError, MemoryBackend, TreeStructure};

async fn flat() -> Grove {
    let grove = Grove::with_root(MemoryBackend::new(), "/flat");
    grove
        .hydrate(
            &TreeStructure::new()
                .file("a.test.ts", "t")
                .file("a.ts", "s")
                .file("a.js", "j"),
            None,
        )
        .await
        .unwrap();
    grove
}

/// Test that the include filter applies before the ignore filter
#[tokio::test]
async fn test_scoped_include_then_ignore() {
    let grove = flat().await;
    let filter = Filter::scoped(
        Some(Filter::patterns(["*.ts"])),
        Some(Filter::patterns(["*.test.ts"])),
    )
    .unwrap();

    let tree = grove.tree(None, filter.as_ref()).await.unwrap();
    let names: Vec<_> = tree.children.iter().map(|node| node.name()).collect();

    assert_eq!(names, vec!["a.ts"]);
}

/// Test that an absent scoped pair means no filter at all
#[tokio::test]
async fn test_scoped_without_parts() {
    assert!(Filter::scoped(None, None).unwrap().is_none());

    let grove = flat().await;
    let tree = grove.tree(None, None).await.unwrap();
    assert_eq!(tree.children.len(), 3);
}

/// Test that ignore patterns prune whole directories
#[tokio::test]
async fn test_ignore_patterns_prune_directories() {
    let grove = memory_project().await;
    let filter = Filter::patterns(["node_modules", "*.test.ts"]);

    let tree = grove.tree(None, Some(&filter)).await.unwrap();

    assert!(tree.descendants().all(|node| !node.path().starts_with("node_modules")));
    assert!(tree.descendants().all(|node| node.name() != "index.test.ts"));
    assert!(tree.descendants().any(|node| node.path() == "src/utils/math.ts"));
}

/// Test that `files` applies the default ignore list
#[tokio::test]
async fn test_files_uses_default_ignore() {
    let grove = memory_project().await;

    let files: Vec<_> = grove.files(None, None).unwrap().try_collect().await.unwrap();
    let paths: Vec<_> = files.iter().map(|file| file.path.as_str()).collect();

    assert_eq!(paths.len(), 5);
    assert!(!paths.iter().any(|path| path.starts_with("node_modules")));
}

/// Test that a failing predicate surfaces as a filter evaluation error
#[tokio::test]
async fn test_predicate_failure_propagates() {
    let grove = memory_project().await;
    let filter = Filter::try_predicate(|entry| {
        if entry.name == "utils" {
            anyhow::bail!("cannot judge {}", entry.path);
        }
        Ok(true)
    });

    let err = grove.tree(None, Some(&filter)).await.unwrap_err();

    assert!(matches!(err, GroveError::FilterEvaluation { ref path, .. } if path == "src/utils"));
}

/// Test an asynchronous predicate restricted to shallow entries
#[tokio::test]
async fn test_async_predicate() {
    let grove = memory_project().await;
    let filter = Filter::async_predicate(|entry| async move { Ok(entry.depth == 1) });

    let nodes = grove.directory(None, Some(&filter)).await.unwrap();

    assert_eq!(nodes.len(), 5);
    assert!(nodes.iter().all(|node| node.depth() == 1));
    let src = nodes.iter().find(|node| node.name() == "src").unwrap();
    assert!(src.expect_directory().unwrap().children.is_empty());
}

/// Test that walk yields resolved paths for accepted entries
#[tokio::test]
async fn test_walk_resolves_paths() {
    let grove = memory_project().await;
    let filter = Filter::patterns(["node_modules"]);

    let items: Vec<_> = grove
        .walk(Some("src"), Some(&filter))
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert!(items.iter().all(|item| item.path.starts_with("/proj/src/")));
    assert!(items.iter().any(|item| item.path == "/proj/src/utils/math.ts"));
}

/// Test that invalid patterns are rejected at compile time
#[tokio::test]
async fn test_invalid_pattern() {
    let grove = memory_project().await;
    let filter = Filter::patterns(["a["]);

    let err = grove.tree(None, Some(&filter)).await.unwrap_err();

    assert!(matches!(err, GroveError::InvalidPattern { .. }));
}
