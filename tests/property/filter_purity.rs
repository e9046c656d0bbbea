//! Property-based tests for filter determinism

use grove::tree::filter::compile;
use grove::{Filter, WalkEntry};
use proptest::prelude::*;

fn relative_path() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,4}(\\.[a-z]{1,2})?", 1..5).prop_map(|segments| segments.join("/"))
}

/// Test that pattern filters give the same answer for the same entry
#[test]
fn test_pattern_filter_is_pure() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let filter = compile(Some(&Filter::patterns(["*.ts", "node_modules", "a*"])))
        .unwrap()
        .unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(relative_path(), any::<bool>()), |(path, is_file)| {
            let entry = WalkEntry::new(&path, is_file);
            let first = runtime.block_on(filter.accepts(&entry)).unwrap();
            let second = runtime.block_on(filter.accepts(&entry.clone())).unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

/// Test that an ignored directory name is rejected at any depth
#[test]
fn test_ignored_name_rejected_everywhere() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let filter = compile(Some(&Filter::patterns(["node_modules"])))
        .unwrap()
        .unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(relative_path(), relative_path()), |(prefix, suffix)| {
            let dir = WalkEntry::new(&format!("{prefix}/node_modules"), false);
            let inside = WalkEntry::new(&format!("{prefix}/node_modules/{suffix}"), true);
            prop_assert!(!runtime.block_on(filter.accepts(&dir)).unwrap());
            prop_assert!(!runtime.block_on(filter.accepts(&inside)).unwrap());
            Ok(())
        })
        .unwrap();
}

/// Test that a scoped filter accepts exactly what both parts allow
#[test]
fn test_scoped_filter_matches_its_parts() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let include = Filter::predicate(|entry| entry.depth <= 2);
    let ignore = Filter::patterns(["*.b"]);
    let scoped = Filter::scoped(Some(include.clone()), Some(ignore.clone()))
        .unwrap()
        .unwrap();
    let scoped = compile(Some(&scoped)).unwrap().unwrap();
    let include = compile(Some(&include)).unwrap().unwrap();
    let ignore = compile(Some(&ignore)).unwrap().unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(relative_path(), any::<bool>()), |(path, is_file)| {
            let entry = WalkEntry::new(&path, is_file);
            let expected = runtime.block_on(include.accepts(&entry)).unwrap()
                && runtime.block_on(ignore.accepts(&entry)).unwrap();
            prop_assert_eq!(runtime.block_on(scoped.accepts(&entry)).unwrap(), expected);
            Ok(())
        })
        .unwrap();
}
