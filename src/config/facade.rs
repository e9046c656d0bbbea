//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::GroveConfig;
use crate::error::Result;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration for a project directory.
    pub fn load(project_dir: &Path) -> Result<GroveConfig> {
        let config = MergeService::load(project_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<GroveConfig> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> GroveConfig {
        GroveConfig::default()
    }
}
