//! Configuration System
//!
//! Layered configuration for provider access, execution defaults, scoring, and logging.
//! Loaded once per process by [`ConfigLoader`] and handed to the scheduler and engines
//! explicitly; nothing in the core reads ambient configuration.

use crate::competition::ScoringPolicy;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;

/// Backward-compatible re-export of XDG path helpers
pub mod xdg {
    pub use super::paths::*;
}

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_PRO_MODEL: &str = "gemini-2.0-pro";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenfleetConfig {
    /// Remote generation service settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Batch execution defaults
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the generation API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model used for single-variant runs, analysis, and sampling-mode competitions
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used when `--pro` is given
    #[serde(default = "default_pro_model")]
    pub pro_model: String,

    /// Per-call timeout, identical for every outbound call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_pro_model() -> String {
    DEFAULT_PRO_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            pro_model: default_pro_model(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Batch execution defaults; CLI flags override these per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum tasks in flight; values <= 0 fall back to the scheduler default
    #[serde(default = "default_concurrency")]
    pub concurrency: i64,

    /// Run every task as a competition between variants
    #[serde(default = "default_true")]
    pub compete: bool,

    /// Competing model names; empty means one model under several sampling modes
    #[serde(default)]
    pub models: Vec<String>,

    /// Write (and score) only the first fenced code block of a reply
    #[serde(default)]
    pub extract_code: bool,

    /// Scoring heuristic used to pick competition winners
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

fn default_concurrency() -> i64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            compete: default_true(),
            models: Vec::new(),
            extract_code: false,
            scoring: ScoringPolicy::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Provider(String),
    Execution(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Execution(msg) => write!(f, "Execution: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ProviderSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model cannot be empty".to_string());
        }
        if self.pro_model.trim().is_empty() {
            return Err("Pro model cannot be empty".to_string());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!(
                "Endpoint must start with http:// or https:// (got '{}')",
                self.endpoint
            ));
        }
        if self.timeout_secs == 0 {
            return Err("Timeout must be at least one second".to_string());
        }
        Ok(())
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(blank) = self.models.iter().position(|m| m.trim().is_empty()) {
            return Err(format!("Model name at position {} is empty", blank));
        }
        Ok(())
    }
}

impl GenfleetConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.execution.validate() {
            errors.push(ValidationError::Execution(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
