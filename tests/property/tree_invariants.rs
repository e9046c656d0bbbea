//! Property-based tests for build and hydrate invariants

use grove::{DirectoryNode, Grove, MemoryBackend, StorageBackend, TreeNode, TreeStructure};
use proptest::prelude::*;
use std::collections::HashSet;

fn structure() -> impl Strategy<Value = TreeStructure> {
    let leaf = proptest::collection::btree_map("[a-z]{1,5}\\.txt", "[a-z ]{0,12}", 0..4)
        .prop_map(|files| {
            files
                .into_iter()
                .fold(TreeStructure::new(), |acc, (name, content)| acc.file(name, content))
        });
    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            proptest::collection::btree_map("[a-z]{1,5}", inner, 0..4),
            proptest::collection::btree_map("[a-z]{1,5}\\.md", "[a-z]{0,8}", 0..3),
        )
            .prop_map(|(dirs, files)| {
                let with_files = files
                    .into_iter()
                    .fold(TreeStructure::new(), |acc, (name, content)| acc.file(name, content));
                dirs.into_iter()
                    .fold(with_files, |acc, (name, contents)| acc.dir(name, contents))
            })
    })
}

fn check_depths(dir: &DirectoryNode) -> Result<(), TestCaseError> {
    for child in &dir.children {
        prop_assert_eq!(child.depth(), dir.depth + 1);
        if let TreeNode::Directory(sub) = child {
            check_depths(sub)?;
        }
    }
    Ok(())
}

/// Test that hydrate then build reproduces any structure with sound depths
#[test]
fn test_hydrate_build_round_trip() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    });

    runner
        .run(&structure(), |structure| {
            let grove = Grove::with_root(MemoryBackend::new(), "/root");
            let tree = runtime.block_on(async {
                grove.backend().create_directory("/root").await.unwrap();
                grove.hydrate(&structure, None).await.unwrap();
                grove.tree(None, None).await.unwrap()
            });

            prop_assert_eq!(tree.depth, 0);
            check_depths(&tree)?;

            let mut seen = HashSet::new();
            for node in tree.descendants() {
                prop_assert!(seen.insert(node.path().to_string()));
            }

            prop_assert_eq!(tree.to_structure(), structure);
            Ok(())
        })
        .unwrap();
}
