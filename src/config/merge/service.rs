//! MergeService: orchestrates sources, applies merge policy, deserializes to GroveConfig.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::GroveConfig;
use config::ConfigError;
use config::File;
use std::path::Path;
use tracing::debug;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from the standard sources.
    /// Precedence: defaults (lowest) -> global file -> project file -> environment (highest).
    pub fn load(project_dir: &Path) -> Result<GroveConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, project_dir)?;
        let builder = environment::add_to_builder(builder)?;

        let config: GroveConfig = builder.build()?.try_deserialize()?;
        debug!(root = %config.root, "Configuration loaded");
        Ok(config)
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<GroveConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
