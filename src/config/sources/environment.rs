//! Environment variable source: GROVE_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
///
/// `GROVE_ROOT` sets `root`, `GROVE_WALK__SORT_ENTRIES` sets
/// `walk.sort_entries`, and `GROVE_DEFAULT_IGNORE` takes a comma-separated
/// list.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("GROVE")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("default_ignore"),
    );
    Ok(builder)
}
