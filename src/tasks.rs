//! Task model and task sources.
//!
//! A batch is an ordered list of [`Task`]s read from a JSON string, a JSON file, or a
//! preset compiled into the binary. Any malformed source is a setup error: nothing is
//! dispatched until the whole list parses.

use crate::error::{ApiError, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One generation job: what to ask for and where to put the answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub file_name: String,
    pub output_path: PathBuf,
    pub prompt: String,
}

impl Task {
    pub fn new(
        file_name: impl Into<String>,
        output_path: impl Into<PathBuf>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            output_path: output_path.into(),
            prompt: prompt.into(),
        }
    }
}

/// Where a batch of tasks comes from
#[derive(Debug, Clone)]
pub enum TaskSource {
    /// Inline JSON array
    Json(String),
    /// Path to a JSON file
    File(PathBuf),
    /// Name of a built-in preset
    Preset(String),
}

impl TaskSource {
    /// Interpret a `from-template` argument: `*.json` is a file, anything else a preset.
    pub fn from_template_arg(arg: &str) -> Self {
        let path = Path::new(arg);
        if path.extension().map(|ext| ext == "json").unwrap_or(false) {
            TaskSource::File(path.to_path_buf())
        } else {
            TaskSource::Preset(arg.to_string())
        }
    }

    pub fn load(&self) -> Result<Vec<Task>, ApiError> {
        match self {
            TaskSource::Json(raw) => parse_tasks(raw),
            TaskSource::File(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| {
                    ApiError::StorageError(StorageError::Read {
                        path: path.clone(),
                        source,
                    })
                })?;
                parse_tasks(&raw)
            }
            TaskSource::Preset(name) => presets::load(name),
        }
    }
}

/// Parse a JSON array of tasks
pub fn parse_tasks(raw: &str) -> Result<Vec<Task>, ApiError> {
    serde_json::from_str::<Vec<Task>>(raw)
        .map_err(|e| ApiError::TaskSource(format!("Failed to parse task JSON: {}", e)))
}

pub mod presets {
    //! Presets compiled into the binary.

    use super::{parse_tasks, Task};
    use crate::error::ApiError;

    const PRESETS: &[(&str, &str)] = &[
        (
            "game-components",
            include_str!("../presets/game-components.json"),
        ),
        ("web-app", include_str!("../presets/web-app.json")),
    ];

    /// Preset names, sorted
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = PRESETS.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    pub fn load(name: &str) -> Result<Vec<Task>, ApiError> {
        let (_, raw) = PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .ok_or_else(|| ApiError::PresetNotFound(name.to_string()))?;
        parse_tasks(raw)
    }
}
