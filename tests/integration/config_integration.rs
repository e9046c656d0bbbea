//! Integration tests for configuration loading

use super::test_utils::with_xdg_config_home;
use grove::config::{global_config_path, PROJECT_CONFIG_FILE};
use grove::{ConfigLoader, Grove, GroveError, MemoryBackend};
use std::fs;
use tempfile::TempDir;

/// Test that a directory without config files yields the defaults
#[test]
fn test_load_defaults() {
    with_xdg_config_home(|_| {
        let project = TempDir::new().unwrap();
        let config = ConfigLoader::load(project.path()).unwrap();

        assert_eq!(config, ConfigLoader::default());
        assert_eq!(config.root, ".");
        assert_eq!(config.default_ignore, vec!["node_modules", ".git", ".DS_Store"]);
        assert!(config.walk.sort_entries);
        assert!(!config.walk.follow_symlinks);
    });
}

/// Test that the project file overrides the global file
#[test]
fn test_project_overrides_global() {
    with_xdg_config_home(|xdg| {
        let global = global_config_path().unwrap();
        assert!(global.starts_with(xdg.path()));
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            "root = \"/global\"\n[walk]\nfollow_symlinks = true\n",
        )
        .unwrap();

        let project = TempDir::new().unwrap();
        fs::write(project.path().join(PROJECT_CONFIG_FILE), "root = \"/project\"\n").unwrap();

        let config = ConfigLoader::load(project.path()).unwrap();
        assert_eq!(config.root, "/project");
        assert!(config.walk.follow_symlinks);
    });
}

/// Test loading one explicit file
#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        "default_ignore = [\"target\"]\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();

    assert_eq!(config.default_ignore, vec!["target"]);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.root, ".");
}

/// Test that invalid values are rejected during load
#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "root = \"\"\n[logging]\nformat = \"xml\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&path).unwrap_err();

    let GroveError::Config(message) = err else {
        panic!("expected a configuration error, got {err:?}");
    };
    assert!(message.contains("root cannot be empty"));
    assert!(message.contains("logging"));
}

/// Test building a facade from loaded configuration
#[test]
fn test_facade_from_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grove.toml");
    fs::write(&path, "root = \"/srv/site/\"\ndefault_ignore = [\"dist\"]\n").unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    let grove = Grove::from_config(MemoryBackend::new(), &config).unwrap();

    assert_eq!(grove.root(), "/srv/site");
    assert_eq!(grove.resolve_path(Some("index.html")), "/srv/site/index.html");
}
