//! Scoring heuristic for competition outcomes.
//!
//! [`ScoringPolicy`] is plain data so thresholds and keywords can be tuned from
//! configuration; [`Scorer`] is the seam for replacing the heuristic entirely.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scores one eligible outcome. Higher is better.
pub trait Scorer: Send + Sync {
    fn score(&self, content: &str, duration: Duration) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    #[serde(default = "default_base_score")]
    pub base_score: f64,

    /// Content shorter than this many characters is penalised
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_short_penalty")]
    pub short_penalty: f64,

    /// Content longer than this many characters is penalised
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_long_penalty")]
    pub long_penalty: f64,

    #[serde(default = "default_fast_threshold_ms")]
    pub fast_threshold_ms: u64,
    #[serde(default = "default_fast_bonus")]
    pub fast_bonus: f64,

    #[serde(default = "default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,
    #[serde(default = "default_slow_penalty")]
    pub slow_penalty: f64,

    /// Each keyword present as a substring adds `keyword_bonus` once
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_keyword_bonus")]
    pub keyword_bonus: f64,

    /// Imports matching `import_marker` without `approved_import_source` are penalised
    #[serde(default = "default_import_marker")]
    pub import_marker: String,
    #[serde(default = "default_approved_import_source")]
    pub approved_import_source: String,
    #[serde(default = "default_external_import_penalty")]
    pub external_import_penalty: f64,
}

fn default_base_score() -> f64 {
    100.0
}

fn default_min_length() -> usize {
    100
}

fn default_short_penalty() -> f64 {
    20.0
}

fn default_max_length() -> usize {
    10_000
}

fn default_long_penalty() -> f64 {
    10.0
}

fn default_fast_threshold_ms() -> u64 {
    2_000
}

fn default_fast_bonus() -> f64 {
    10.0
}

fn default_slow_threshold_ms() -> u64 {
    10_000
}

fn default_slow_penalty() -> f64 {
    20.0
}

fn default_keywords() -> Vec<String> {
    ["export", "function", "const", "return", "useState", "import"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_keyword_bonus() -> f64 {
    5.0
}

fn default_import_marker() -> String {
    "import {".to_string()
}

fn default_approved_import_source() -> String {
    "from 'react'".to_string()
}

fn default_external_import_penalty() -> f64 {
    15.0
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_score: default_base_score(),
            min_length: default_min_length(),
            short_penalty: default_short_penalty(),
            max_length: default_max_length(),
            long_penalty: default_long_penalty(),
            fast_threshold_ms: default_fast_threshold_ms(),
            fast_bonus: default_fast_bonus(),
            slow_threshold_ms: default_slow_threshold_ms(),
            slow_penalty: default_slow_penalty(),
            keywords: default_keywords(),
            keyword_bonus: default_keyword_bonus(),
            import_marker: default_import_marker(),
            approved_import_source: default_approved_import_source(),
            external_import_penalty: default_external_import_penalty(),
        }
    }
}

impl Scorer for ScoringPolicy {
    fn score(&self, content: &str, duration: Duration) -> f64 {
        let mut score = self.base_score;

        let length = content.chars().count();
        if length < self.min_length {
            score -= self.short_penalty;
        } else if length > self.max_length {
            score -= self.long_penalty;
        }

        if duration < Duration::from_millis(self.fast_threshold_ms) {
            score += self.fast_bonus;
        } else if duration > Duration::from_millis(self.slow_threshold_ms) {
            score -= self.slow_penalty;
        }

        let hits = self
            .keywords
            .iter()
            .filter(|keyword| content.contains(keyword.as_str()))
            .count();
        score += hits as f64 * self.keyword_bonus;

        if !self.import_marker.is_empty()
            && content.contains(self.import_marker.as_str())
            && !content.contains(self.approved_import_source.as_str())
        {
            score -= self.external_import_penalty;
        }

        score
    }
}
