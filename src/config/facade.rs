//! Config loader facade: one entry point over defaults, files, and environment.

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{global_file, workspace_file};
use super::GenfleetConfig;
use crate::error::ApiError;
use config::{Environment, File};
use std::path::Path;
use tracing::debug;

/// Loads [`GenfleetConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global config file, workspace
    /// `config/config.toml`, workspace `config/{GENFLEET_ENV}.toml`, `GENFLEET__*` env vars.
    pub fn load(workspace_root: &Path) -> Result<GenfleetConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder
            .add_source(Environment::with_prefix("GENFLEET").separator("__"))
            .build()?
            .try_deserialize::<GenfleetConfig>()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from a single file over defaults; no other sources apply.
    pub fn load_from_file(path: &Path) -> Result<GenfleetConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<GenfleetConfig>()?;
        Ok(config)
    }

    /// Built-in defaults only.
    pub fn default() -> GenfleetConfig {
        GenfleetConfig::default()
    }
}
