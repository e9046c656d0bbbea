//! Shared test utilities for integration tests

use grove::{Grove, MemoryBackend, TreeStructure};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that touch `XDG_CONFIG_HOME`
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with `XDG_CONFIG_HOME` pointing at a fresh temporary directory.
///
/// The previous value is restored afterwards, even if `f` panics.
pub fn with_xdg_config_home<F, R>(f: F) -> R
where
    F: FnOnce(&TempDir) -> R + std::panic::UnwindSafe,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let original = std::env::var_os("XDG_CONFIG_HOME");
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    let result = std::panic::catch_unwind(|| f(&temp_dir));

    match original {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// A small project layout used across tests.
pub fn project_structure() -> TreeStructure {
    TreeStructure::new()
        .dir(
            "src",
            TreeStructure::new()
                .file("index.ts", "export {}")
                .file("index.test.ts", "test('index')")
                .dir(
                    "utils",
                    TreeStructure::new().file("math.ts", "export const add = (a, b) => a + b"),
                ),
        )
        .dir(
            "node_modules",
            TreeStructure::new().dir("dep", TreeStructure::new().file("index.js", "module.exports = 1")),
        )
        .dir("empty", TreeStructure::new())
        .file("README.md", "# hi")
        .file("package.json", r#"{"name": "proj", "version": "1.0.0"}"#)
}

/// A memory-backed facade rooted at `/proj` holding [`project_structure`].
pub async fn memory_project() -> Grove {
    let grove = Grove::with_root(MemoryBackend::new(), "/proj");
    grove.hydrate(&project_structure(), None).await.unwrap();
    grove
}
