//! Chunked parallel analysis.
//!
//! Files are split into contiguous chunks, one generation call per chunk, bounded by a
//! semaphore. The merge is all-or-nothing: one failed chunk fails the whole analysis.

use super::parse::parse_response;
use super::prompt::PromptBuilder;
use super::scanner::SourceFile;
use super::AnalysisResult;
use crate::error::ApiError;
use crate::progress::{NoProgress, ProgressEvent, ProgressSink};
use crate::provider::{GenerationClient, GenerationRequest, SamplingConfig};
use crate::scheduler::Concurrency;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Split `items` into `min(k, n)` contiguous chunks of near-equal size.
///
/// Chunk sizes differ by at most one; the `n % count` leftover items go one each to the
/// leading chunks. `k == 0` is treated as 1 and empty input yields no chunks.
pub fn split_into_chunks<T>(items: &[T], k: usize) -> Vec<&[T]> {
    let n = items.len();
    if n == 0 {
        return Vec::new();
    }
    let count = k.max(1).min(n);
    let (size, extra) = (n / count, n % count);

    let mut chunks = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let end = start + size + usize::from(i < extra);
        chunks.push(&items[start..end]);
        start = end;
    }
    chunks
}

pub struct ChunkedAnalysisRunner {
    client: Arc<dyn GenerationClient>,
    model: String,
    sampling: SamplingConfig,
    prompts: PromptBuilder,
    progress: Arc<dyn ProgressSink>,
}

impl ChunkedAnalysisRunner {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        model: impl Into<String>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            sampling: SamplingConfig::balanced(),
            prompts,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// One call over every file
    pub async fn analyze_single(&self, files: &[SourceFile]) -> Result<AnalysisResult, ApiError> {
        let request =
            GenerationRequest::new(self.model.clone(), self.prompts.build(files), self.sampling);
        let response = self.client.generate(&request).await?;
        Ok(parse_response(&response))
    }

    /// One call per chunk, at most `concurrency` in flight, merged in chunk order
    pub async fn analyze_parallel(
        &self,
        files: &[SourceFile],
        concurrency: Concurrency,
    ) -> Result<AnalysisResult, ApiError> {
        let chunks = split_into_chunks(files, concurrency.get());
        info!(
            files = files.len(),
            chunks = chunks.len(),
            concurrency = concurrency.get(),
            "Starting chunked analysis"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency.get()));
        let mut handles = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            let prompt = self.prompts.build(chunk);
            let request = GenerationRequest::new(self.model.clone(), prompt, self.sampling);
            let files_in_chunk = chunk.len();
            let semaphore = Arc::clone(&semaphore);
            let client = Arc::clone(&self.client);
            let progress = Arc::clone(&self.progress);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| format!("Scheduler closed: {}", e))?;

                progress.emit(ProgressEvent::ChunkStarted {
                    index,
                    files: files_in_chunk,
                });
                let started = Instant::now();
                let result = client.generate(&request).await;
                let duration_ms = started.elapsed().as_millis() as u64;
                progress.emit(ProgressEvent::ChunkFinished {
                    index,
                    ok: result.is_ok(),
                    duration_ms,
                });
                debug!(chunk = index, ok = result.is_ok(), duration_ms, "Chunk finished");

                result
                    .map(|response| parse_response(&response))
                    .map_err(|e| e.to_string())
            }));
        }

        let mut parts = Vec::with_capacity(handles.len());
        let mut first_failure: Option<(usize, String)> = None;
        for (index, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(format!("Chunk task aborted: {}", e)),
            };
            match outcome {
                Ok(part) => parts.push(part),
                Err(message) => {
                    warn!(chunk = index, error = %message, "Chunk failed");
                    if first_failure.is_none() {
                        first_failure = Some((index, message));
                    }
                }
            }
        }

        if let Some((index, message)) = first_failure {
            return Err(ApiError::ChunkFailed { index, message });
        }
        Ok(AnalysisResult::merge(parts))
    }
}
