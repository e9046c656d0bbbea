//! Property-based tests for path handling

use grove::tree::path;
use proptest::prelude::*;

fn messy_path() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        "[a-z]{1,3}",
        Just(".".to_string()),
        Just("..".to_string()),
        Just(String::new()),
    ];
    (proptest::collection::vec(segment, 0..8), any::<bool>()).prop_map(|(segments, absolute)| {
        let body = segments.join("/");
        if absolute {
            format!("/{body}")
        } else {
            body
        }
    })
}

/// Test that normalizing twice changes nothing
#[test]
fn test_normalize_is_idempotent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&messy_path(), |raw| {
            let once = path::normalize(&raw);
            prop_assert_eq!(path::normalize(&once), once.clone());
            prop_assert!(!once.is_empty());
            prop_assert_eq!(path::is_absolute(&once), path::is_absolute(&raw));
            Ok(())
        })
        .unwrap();
}

/// Test that joining onto an absolute base stays below it unless `..` escapes
#[test]
fn test_join_relative_stays_under_base() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&proptest::collection::vec("[a-z]{1,5}", 1..6), |segments| {
            let relative = segments.join("/");
            let joined = path::join("/base", &relative);
            prop_assert_eq!(joined.clone(), format!("/base/{relative}"));
            prop_assert_eq!(path::relative_to("/base", &joined), Some(relative));
            prop_assert_eq!(path::dirname(&joined), path::normalize(&format!("{joined}/..")));
            Ok(())
        })
        .unwrap();
}
