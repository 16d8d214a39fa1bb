//! XDG path helpers for configuration and credentials.

use crate::error::ApiError;
use directories::BaseDirs;
use std::path::PathBuf;

pub const APP_DIR: &str = "genfleet";

/// Resolve the XDG config home: `$XDG_CONFIG_HOME`, else `~/.config`.
pub fn config_home() -> Result<PathBuf, ApiError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config"))
        .ok_or_else(|| ApiError::ConfigError("Could not determine home directory".to_string()))
}

/// Directory holding genfleet's global config and credentials.
pub fn app_config_dir() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join(APP_DIR))
}
