//! Concurrent variant execution.
//!
//! Every variant gets its own spawned unit with no concurrency cap; the task-level
//! semaphore already bounds how many competitions run. Outcomes land at the variant's
//! declared index whether the call succeeded, failed, or the unit panicked.

use super::VariantOutcome;
use crate::provider::{extract_code_block, GenerationClient};
use crate::variant::Variant;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

pub struct VariantRunner {
    client: Arc<dyn GenerationClient>,
    extract_code: bool,
}

impl VariantRunner {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            extract_code: false,
        }
    }

    /// Keep only the first fenced code block of each successful reply
    pub fn with_code_extraction(mut self, extract_code: bool) -> Self {
        self.extract_code = extract_code;
        self
    }

    /// Run `prompt` once per variant; returns one outcome per variant, in order
    pub async fn run(&self, prompt: &str, variants: &[Variant]) -> Vec<VariantOutcome> {
        let handles: Vec<_> = variants
            .iter()
            .cloned()
            .map(|variant| {
                let client = Arc::clone(&self.client);
                let request = variant.request(prompt);
                let extract_code = self.extract_code;
                tokio::spawn(async move {
                    let started = Instant::now();
                    let result = client.generate(&request).await;
                    let duration = started.elapsed();

                    let result = match result {
                        Ok(content) if extract_code => Ok(extract_code_block(&content)),
                        Ok(content) => Ok(content),
                        Err(e) => {
                            warn!(variant = %variant.name, error = %e, "Variant failed");
                            Err(e.to_string())
                        }
                    };
                    debug!(
                        variant = %variant.name,
                        duration_ms = duration.as_millis() as u64,
                        ok = result.is_ok(),
                        "Variant finished"
                    );

                    VariantOutcome {
                        variant,
                        result,
                        duration,
                        score: None,
                    }
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(variants)
            .map(|(joined, variant)| {
                joined.unwrap_or_else(|e| VariantOutcome {
                    variant: variant.clone(),
                    result: Err(format!("Variant task aborted: {}", e)),
                    duration: Duration::ZERO,
                    score: None,
                })
            })
            .collect()
    }
}
