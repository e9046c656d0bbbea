//! Configuration System
//!
//! Layered configuration for the [`Grove`](crate::api::Grove) facade: built-in
//! defaults, a user-level file, a project-level `grove.toml`, and `GROVE_*`
//! environment variables, merged in that order.

use crate::error::{GroveError, Result};
use crate::logging::LoggingConfig;
use crate::tree::filter::{compile, Filter};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::PROJECT_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroveConfig {
    /// Directory relative paths are resolved against
    #[serde(default = "default_root")]
    pub root: String,

    /// Patterns `files()` ignores when the caller supplies no filter
    #[serde(default = "default_ignore")]
    pub default_ignore: Vec<String>,

    /// Local disk walk behavior
    #[serde(default)]
    pub walk: WalkConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Walk settings for the local backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Sort directory entries by name (default: true)
    #[serde(default = "default_true")]
    pub sort_entries: bool,
}

pub(crate) fn default_root() -> String {
    ".".to_string()
}

pub(crate) fn default_ignore() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        ".git".to_string(),
        ".DS_Store".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            sort_entries: default_true(),
        }
    }
}

impl Default for GroveConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            default_ignore: default_ignore(),
            walk: WalkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GroveConfig {
    /// Validate the entire configuration
    ///
    /// All problems are collected into one [`GroveError::Config`].
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.root.trim().is_empty() {
            errors.push("root cannot be empty".to_string());
        }
        if let Err(e) = compile(Some(&Filter::Patterns(self.default_ignore.clone()))) {
            errors.push(format!("default_ignore: {}", e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(format!("logging: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GroveError::Config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}
