//! Variant Competition
//!
//! Runs one task against every variant at once, scores the eligible outcomes and keeps
//! the best. A competition never fails as a whole: individual variant errors are kept
//! in their outcome, and total failure is reported as `best == None`.

use crate::provider::GenerationClient;
use crate::tasks::Task;
use crate::variant::Variant;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod runner;
pub mod scoring;
pub mod selector;

pub use runner::VariantRunner;
pub use scoring::{Scorer, ScoringPolicy};
pub use selector::{Selection, Selector, ALL_FAILED};

/// Result of one variant call
#[derive(Debug, Clone, Serialize)]
pub struct VariantOutcome {
    pub variant: Variant,
    /// Generated content, or the error message of the failed call
    pub result: Result<String, String>,
    pub duration: Duration,
    /// Set by the selector for eligible outcomes only
    pub score: Option<f64>,
}

impl VariantOutcome {
    pub fn content(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }

    /// Error-free with non-empty content
    pub fn is_eligible(&self) -> bool {
        self.content().map(|c| !c.is_empty()).unwrap_or(false)
    }
}

/// Everything a competition produced for one task
#[derive(Debug, Clone, Serialize)]
pub struct CompetitionResult {
    pub task: Task,
    /// One outcome per variant, in declaration order
    pub outcomes: Vec<VariantOutcome>,
    /// Index into `outcomes`; `None` when every variant failed
    pub best: Option<usize>,
    pub justification: String,
    /// Set when the winning content could not be written
    pub write_error: Option<String>,
}

impl CompetitionResult {
    pub fn best_outcome(&self) -> Option<&VariantOutcome> {
        self.best.and_then(|index| self.outcomes.get(index))
    }

    pub fn best_content(&self) -> Option<&str> {
        self.best_outcome().and_then(VariantOutcome::content)
    }

    /// A winner exists and was persisted
    pub fn is_success(&self) -> bool {
        self.best.is_some() && self.write_error.is_none()
    }
}

/// Variant runner plus selector, applied per task
pub struct CompetitionEngine {
    runner: VariantRunner,
    selector: Selector,
}

impl CompetitionEngine {
    pub fn new(client: Arc<dyn GenerationClient>, selector: Selector) -> Self {
        Self {
            runner: VariantRunner::new(client),
            selector,
        }
    }

    pub fn with_code_extraction(mut self, extract_code: bool) -> Self {
        self.runner = self.runner.with_code_extraction(extract_code);
        self
    }

    /// Run the competition for `task`. `variants` must be non-empty.
    pub async fn compete(&self, task: &Task, variants: &[Variant]) -> CompetitionResult {
        let mut outcomes = self.runner.run(&task.prompt, variants).await;
        let Selection {
            best,
            justification,
        } = self.selector.select(&mut outcomes);

        match best {
            Some(index) => info!(
                task = %task.file_name,
                variant = %outcomes[index].variant.name,
                score = outcomes[index].score.unwrap_or_default(),
                "Competition winner selected"
            ),
            None => warn!(task = %task.file_name, "All variants failed"),
        }

        CompetitionResult {
            task: task.clone(),
            outcomes,
            best,
            justification,
            write_error: None,
        }
    }
}
