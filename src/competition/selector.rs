//! Winner selection over competition outcomes.

use super::scoring::{Scorer, ScoringPolicy};
use super::VariantOutcome;
use std::sync::Arc;

/// Justification recorded when no outcome is eligible
pub const ALL_FAILED: &str = "all variants failed";

/// Outcome of a selection pass
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub best: Option<usize>,
    pub justification: String,
}

/// Scores eligible outcomes and picks the best.
///
/// Pure apart from writing each eligible outcome's score back into it: identical
/// outcomes always produce the identical winner.
#[derive(Clone)]
pub struct Selector {
    scorer: Arc<dyn Scorer>,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(Arc::new(ScoringPolicy::default()))
    }
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector").finish_non_exhaustive()
    }
}

impl Selector {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self { scorer }
    }

    pub fn from_policy(policy: ScoringPolicy) -> Self {
        Self::new(Arc::new(policy))
    }

    pub fn select(&self, outcomes: &mut [VariantOutcome]) -> Selection {
        let mut best: Option<(usize, f64)> = None;

        for (index, outcome) in outcomes.iter_mut().enumerate() {
            let score = match outcome.content() {
                Some(content) if !content.is_empty() => {
                    self.scorer.score(content, outcome.duration)
                }
                _ => {
                    outcome.score = None;
                    continue;
                }
            };
            outcome.score = Some(score);

            // Strictly greater keeps the earliest variant on ties
            if best.map(|(_, top)| score > top).unwrap_or(true) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) => {
                let winner = &outcomes[index];
                Selection {
                    best: Some(index),
                    justification: format!(
                        "variant: {} | score: {:.2} | duration: {:.2}s | reason: {}",
                        winner.variant.name,
                        score,
                        winner.duration.as_secs_f64(),
                        winner.variant.character.label()
                    ),
                }
            }
            None => Selection {
                best: None,
                justification: ALL_FAILED.to_string(),
            },
        }
    }
}
