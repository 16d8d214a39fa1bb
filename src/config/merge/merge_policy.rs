//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.endpoint", crate::config::DEFAULT_ENDPOINT)?
        .set_default("provider.model", crate::config::DEFAULT_MODEL)?
        .set_default("provider.pro_model", crate::config::DEFAULT_PRO_MODEL)?
        .set_default("execution.concurrency", 5)?
        .set_default("execution.compete", true)
}
