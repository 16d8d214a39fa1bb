//! Task Scheduler
//!
//! Bounded-concurrency dispatch of a task batch. One unit is spawned per task; a shared
//! semaphore caps how many units do work at once. Join handles are awaited in input
//! order, so result `i` always belongs to task `i` regardless of completion order.
//!
//! A unit's failure (generation error, write error, or panic) is confined to its own
//! result slot. Nothing here returns an error for the batch as a whole.

use crate::competition::{CompetitionEngine, CompetitionResult, Selector};
use crate::persist::write_output;
use crate::progress::{NoProgress, ProgressEvent, ProgressSink};
use crate::provider::{extract_code_block, GenerationClient, GenerationRequest, SamplingConfig};
use crate::tasks::Task;
use crate::variant::Variant;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Maximum number of units doing work at once. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Concurrency(usize);

impl Concurrency {
    pub const DEFAULT: usize = 5;

    /// Values <= 0 fall back to [`Concurrency::DEFAULT`]
    pub fn resolve(requested: i64) -> Self {
        if requested <= 0 {
            Self(Self::DEFAULT)
        } else {
            Self(usize::try_from(requested).unwrap_or(Self::DEFAULT))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Result of a single-variant task
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub task: Task,
    /// Written content, or the error that stopped the task
    pub outcome: Result<String, String>,
    pub duration: Duration,
}

/// Per-task result stored in a batch slot
pub trait TaskOutcome: Send + 'static {
    fn task(&self) -> &Task;

    fn succeeded(&self) -> bool;

    /// Short human-readable explanation of the result
    fn detail(&self) -> Option<String>;

    /// Slot value for a unit that never produced a result
    fn aborted(task: Task, message: String) -> Self;
}

impl TaskOutcome for ExecutionResult {
    fn task(&self) -> &Task {
        &self.task
    }

    fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    fn detail(&self) -> Option<String> {
        self.outcome.as_ref().err().cloned()
    }

    fn aborted(task: Task, message: String) -> Self {
        Self {
            task,
            outcome: Err(message),
            duration: Duration::ZERO,
        }
    }
}

impl TaskOutcome for CompetitionResult {
    fn task(&self) -> &Task {
        &self.task
    }

    fn succeeded(&self) -> bool {
        self.is_success()
    }

    fn detail(&self) -> Option<String> {
        match &self.write_error {
            Some(error) => Some(error.clone()),
            None => Some(self.justification.clone()),
        }
    }

    fn aborted(task: Task, message: String) -> Self {
        Self {
            task,
            outcomes: Vec::new(),
            best: None,
            justification: message,
            write_error: None,
        }
    }
}

/// Counts over a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchSummary {
    pub fn from_results<R: TaskOutcome>(results: &[R]) -> Self {
        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
            total: results.len(),
        }
    }
}

pub struct TaskScheduler {
    client: Arc<dyn GenerationClient>,
    concurrency: Concurrency,
    progress: Arc<dyn ProgressSink>,
    model: String,
    sampling: SamplingConfig,
    extract_code: bool,
    selector: Selector,
}

impl TaskScheduler {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        model: impl Into<String>,
        concurrency: Concurrency,
    ) -> Self {
        Self {
            client,
            concurrency,
            progress: Arc::new(NoProgress),
            model: model.into(),
            sampling: SamplingConfig::balanced(),
            extract_code: false,
            selector: Selector::default(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_code_extraction(mut self, extract_code: bool) -> Self {
        self.extract_code = extract_code;
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// One generation call per task; the content is written to the task's output path
    pub async fn run_single(&self, tasks: Vec<Task>) -> Vec<ExecutionResult> {
        let client = Arc::clone(&self.client);
        let model = self.model.clone();
        let sampling = self.sampling;
        let extract_code = self.extract_code;

        self.dispatch(tasks, false, move |task: Task| {
            let client = Arc::clone(&client);
            let request = GenerationRequest::new(model.clone(), task.prompt.clone(), sampling);
            async move {
                let started = Instant::now();
                let outcome = match client.generate(&request).await {
                    Ok(content) => {
                        let content = if extract_code {
                            extract_code_block(&content)
                        } else {
                            content
                        };
                        match write_output(&task.output_path, &content).await {
                            Ok(()) => Ok(content),
                            Err(e) => Err(e.to_string()),
                        }
                    }
                    Err(e) => Err(e.to_string()),
                };
                ExecutionResult {
                    task,
                    outcome,
                    duration: started.elapsed(),
                }
            }
        })
        .await
    }

    /// Run every task as a competition between `variants`; the winner is written
    pub async fn run_competition(
        &self,
        tasks: Vec<Task>,
        variants: Vec<Variant>,
    ) -> Vec<CompetitionResult> {
        let engine = Arc::new(
            CompetitionEngine::new(Arc::clone(&self.client), self.selector.clone())
                .with_code_extraction(self.extract_code),
        );
        let variants = Arc::new(variants);

        self.dispatch(tasks, true, move |task: Task| {
            let engine = Arc::clone(&engine);
            let variants = Arc::clone(&variants);
            async move {
                let mut result = engine.compete(&task, &variants).await;
                if let Some(content) = result.best_content() {
                    if let Err(e) = write_output(&task.output_path, content).await {
                        warn!(task = %task.file_name, error = %e, "Failed to write winner");
                        result.write_error = Some(e.to_string());
                    }
                }
                result
            }
        })
        .await
    }

    async fn dispatch<R, F, Fut>(&self, tasks: Vec<Task>, compete: bool, unit: F) -> Vec<R>
    where
        R: TaskOutcome,
        F: Fn(Task) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let batch_started = Instant::now();
        let total = tasks.len();
        self.progress.emit(ProgressEvent::BatchStarted {
            total,
            concurrency: self.concurrency.get(),
            compete,
        });
        info!(
            tasks = total,
            concurrency = self.concurrency.get(),
            compete,
            "Dispatching batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency.get()));
        let unit = Arc::new(unit);
        let mut handles = Vec::with_capacity(total);

        for (index, task) in tasks.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let unit = Arc::clone(&unit);
            let progress = Arc::clone(&self.progress);

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return R::aborted(task, format!("Scheduler closed: {}", e)),
                };

                let file_name = task.file_name.clone();
                progress.emit(ProgressEvent::TaskStarted {
                    index,
                    file_name: file_name.clone(),
                });
                debug!(index, task = %file_name, "Task started");

                let started = Instant::now();
                let result = unit(task).await;
                let duration_ms = started.elapsed().as_millis() as u64;

                progress.emit(ProgressEvent::TaskFinished {
                    index,
                    file_name: file_name.clone(),
                    ok: result.succeeded(),
                    duration_ms,
                    detail: result.detail(),
                });
                debug!(
                    index,
                    task = %file_name,
                    ok = result.succeeded(),
                    duration_ms,
                    "Task finished"
                );
                result
            }));
        }

        let mut results = Vec::with_capacity(total);
        for (handle, task) in handles.into_iter().zip(tasks) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(task = %task.file_name, error = %e, "Task unit aborted");
                    R::aborted(task, format!("Task aborted: {}", e))
                }
            };
            results.push(result);
        }

        let summary = BatchSummary::from_results(&results);
        self.progress.emit(ProgressEvent::BatchFinished {
            succeeded: summary.succeeded,
            failed: summary.failed,
            duration_ms: batch_started.elapsed().as_millis() as u64,
        });
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch finished"
        );

        results
    }
}
