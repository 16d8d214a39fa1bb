//! API key storage and resolution.
//!
//! Precedence: explicit flag, then the stored credential file, then `GEMINI_API_KEY`.

use crate::config::xdg;
use crate::error::{ApiError, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Flag,
    File(PathBuf),
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Flag => write!(f, "--api-key flag"),
            CredentialSource::File(path) => write!(f, "credential file {}", path.display()),
            CredentialSource::Environment => write!(f, "{} environment variable", API_KEY_ENV),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedKey {
    pub key: String,
    pub source: CredentialSource,
}

impl ResolvedKey {
    pub fn masked(&self) -> String {
        mask_key(&self.key)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialFile {
    api_key: String,
}

/// Credential file on disk
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/genfleet/credentials.toml`
    pub fn default_location() -> Result<Self, ApiError> {
        Ok(Self::new(xdg::app_config_dir()?.join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored key, or `None` when no file exists
    pub fn load(&self) -> Result<Option<String>, ApiError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            ApiError::StorageError(StorageError::Read {
                path: self.path.clone(),
                source,
            })
        })?;
        let file: CredentialFile = toml::from_str(&raw).map_err(|e| {
            ApiError::ConfigError(format!(
                "Invalid credential file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let key = file.api_key.trim().to_string();
        Ok((!key.is_empty()).then_some(key))
    }

    /// Write `key`, readable by the owner only
    pub fn save(&self, key: &str) -> Result<(), ApiError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::ConfigError("API key cannot be empty".to_string()));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
            restrict_permissions(parent, 0o700)?;
        }

        let body = toml::to_string(&CredentialFile {
            api_key: key.to_string(),
        })
        .map_err(|e| ApiError::ConfigError(format!("Failed to encode credentials: {}", e)))?;
        fs::write(&self.path, body).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        restrict_permissions(&self.path, 0o600)?;

        debug!(path = %self.path.display(), "Stored API key");
        Ok(())
    }

    /// Remove the file; returns whether one existed
    pub fn delete(&self) -> Result<bool, ApiError> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).map_err(StorageError::IoError)?;
        Ok(true)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<(), ApiError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| ApiError::StorageError(StorageError::IoError(e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<(), ApiError> {
    Ok(())
}

/// Resolve the key from the flag, the store, then the process environment
pub fn resolve_api_key(
    flag: Option<&str>,
    store: &CredentialStore,
) -> Result<Option<ResolvedKey>, ApiError> {
    let env = std::env::var(API_KEY_ENV).ok();
    resolve_api_key_from(flag, store, env.as_deref())
}

/// Resolution with the environment value supplied by the caller
pub fn resolve_api_key_from(
    flag: Option<&str>,
    store: &CredentialStore,
    env: Option<&str>,
) -> Result<Option<ResolvedKey>, ApiError> {
    if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(Some(ResolvedKey {
            key: key.to_string(),
            source: CredentialSource::Flag,
        }));
    }
    if let Some(key) = store.load()? {
        return Ok(Some(ResolvedKey {
            key,
            source: CredentialSource::File(store.path().to_path_buf()),
        }));
    }
    Ok(env
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|key| ResolvedKey {
            key: key.to_string(),
            source: CredentialSource::Environment,
        }))
}

/// Like [`resolve_api_key`], but a missing key is an error
pub fn require_api_key(
    flag: Option<&str>,
    store: &CredentialStore,
) -> Result<ResolvedKey, ApiError> {
    resolve_api_key(flag, store)?.ok_or(ApiError::CredentialMissing)
}

/// Show the first and last four characters; short keys are fully hidden
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
