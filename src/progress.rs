//! Progress events for batch and analysis runs.
//!
//! Emission is best-effort: sinks never fail the unit that emits, and a slow sink only
//! delays its own caller.

use owo_colors::OwoColorize;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    BatchStarted {
        total: usize,
        concurrency: usize,
        compete: bool,
    },
    TaskStarted {
        index: usize,
        file_name: String,
    },
    TaskFinished {
        index: usize,
        file_name: String,
        ok: bool,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    BatchFinished {
        succeeded: usize,
        failed: usize,
        duration_ms: u64,
    },
    ChunkStarted {
        index: usize,
        files: usize,
    },
    ChunkFinished {
        index: usize,
        ok: bool,
        duration_ms: u64,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events to the tracing subscriber as structured records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ProgressEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => info!(target: "genfleet::progress", event = %json, "progress"),
            Err(e) => {
                info!(target: "genfleet::progress", error = %e, "unserializable progress event")
            }
        }
    }
}

/// Human-oriented progress lines on stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
    color: bool,
}

impl ConsoleProgress {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn render(&self, event: &ProgressEvent) -> String {
        match event {
            ProgressEvent::BatchStarted {
                total,
                concurrency,
                compete,
            } => format!(
                "Running {} task(s), up to {} at once{}",
                total,
                concurrency,
                if *compete { ", competition mode" } else { "" }
            ),
            ProgressEvent::TaskStarted { index, file_name } => {
                format!("[{}] {} started", index + 1, file_name)
            }
            ProgressEvent::TaskFinished {
                index,
                file_name,
                ok,
                duration_ms,
                detail,
            } => {
                let status = self.status(*ok);
                let mut line = format!(
                    "[{}] {} {} ({:.2}s)",
                    index + 1,
                    status,
                    file_name,
                    *duration_ms as f64 / 1000.0
                );
                if let Some(detail) = detail {
                    line.push_str(": ");
                    line.push_str(detail);
                }
                line
            }
            ProgressEvent::BatchFinished {
                succeeded,
                failed,
                duration_ms,
            } => format!(
                "Finished: {} succeeded, {} failed in {:.2}s",
                succeeded,
                failed,
                *duration_ms as f64 / 1000.0
            ),
            ProgressEvent::ChunkStarted { index, files } => {
                format!("Chunk {} started ({} files)", index + 1, files)
            }
            ProgressEvent::ChunkFinished {
                index,
                ok,
                duration_ms,
            } => format!(
                "Chunk {} {} ({:.2}s)",
                index + 1,
                self.status(*ok),
                *duration_ms as f64 / 1000.0
            ),
        }
    }

    fn status(&self, ok: bool) -> String {
        match (ok, self.color) {
            (true, true) => "ok".green().to_string(),
            (false, true) => "failed".red().to_string(),
            (true, false) => "ok".to_string(),
            (false, false) => "failed".to_string(),
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: ProgressEvent) {
        let line = self.render(&event);
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().push(event);
    }
}
