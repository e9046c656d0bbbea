//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key; lists are replaced whole.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("root", super::super::default_root())?
        .set_default("default_ignore", super::super::default_ignore())?
        .set_default("walk.follow_symlinks", false)?
        .set_default("walk.sort_entries", true)
}
