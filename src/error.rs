//! Error types for genfleet.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem errors raised while persisting results or reading sources
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level error for setup, provider, and analysis failures
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API key not configured. Run `genfleet api set <KEY>` or export GEMINI_API_KEY.")]
    CredentialMissing,

    #[error("Invalid task source: {0}")]
    TaskSource(String),

    #[error("Preset '{0}' not found. Run `genfleet list` to see available presets.")]
    PresetNotFound(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Analysis of chunk {index} failed: {message}")]
    ChunkFailed { index: usize, message: String },

    #[error("No files to analyze under {0:?}")]
    NoFilesFound(Vec<PathBuf>),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
