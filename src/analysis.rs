//! Codebase Analysis
//!
//! Scan source files, ask the generation service for an analysis, and render a report.
//! Review mode with concurrency above one fans out over file chunks through
//! [`ChunkedAnalysisRunner`]; every other case is a single call.

use crate::error::ApiError;
use crate::persist::write_output;
use crate::progress::{NoProgress, ProgressSink};
use crate::provider::GenerationClient;
use crate::scheduler::Concurrency;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

pub mod parse;
pub mod prompt;
pub mod report;
pub mod runner;
pub mod scanner;

pub use parse::parse_response;
pub use prompt::PromptBuilder;
pub use report::render_report;
pub use runner::{split_into_chunks, ChunkedAnalysisRunner};
pub use scanner::{Scanner, ScannerConfig, SourceFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzeMode {
    #[default]
    Summary,
    Architect,
    Refactor,
    Security,
    Performance,
    Review,
}

impl AnalyzeMode {
    pub const ALL: [AnalyzeMode; 6] = [
        AnalyzeMode::Summary,
        AnalyzeMode::Architect,
        AnalyzeMode::Refactor,
        AnalyzeMode::Security,
        AnalyzeMode::Performance,
        AnalyzeMode::Review,
    ];

    /// An explicit mode wins; a bare query means a review
    pub fn resolve(explicit: Option<AnalyzeMode>, query: Option<&str>) -> Self {
        match (explicit, query.map(str::trim).filter(|q| !q.is_empty())) {
            (Some(mode), _) => mode,
            (None, Some(_)) => AnalyzeMode::Review,
            (None, None) => AnalyzeMode::Summary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzeMode::Summary => "summary",
            AnalyzeMode::Architect => "architect",
            AnalyzeMode::Refactor => "refactor",
            AnalyzeMode::Security => "security",
            AnalyzeMode::Performance => "performance",
            AnalyzeMode::Review => "review",
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            AnalyzeMode::Summary => {
                "Give an overview of the project:\n\
                 - purpose and features\n\
                 - technologies and frameworks in use\n\
                 - overall code quality\n\
                 - the most important improvements\n\n"
            }
            AnalyzeMode::Architect => {
                "Analyze the architecture:\n\
                 - overall project structure\n\
                 - main components and how they relate\n\
                 - patterns and practices in use\n\
                 - dependencies\n\
                 - possible improvements\n\n"
            }
            AnalyzeMode::Refactor => {
                "Propose refactoring candidates:\n\
                 - duplicated code\n\
                 - overly complex functions or types\n\
                 - naming improvements\n\
                 - dead code\n\
                 - performance opportunities\n\n"
            }
            AnalyzeMode::Security => {
                "Analyze security:\n\
                 - vulnerabilities\n\
                 - vulnerable dependencies\n\
                 - hard-coded secrets\n\
                 - missing input validation\n\
                 - authentication and authorization problems\n\n"
            }
            AnalyzeMode::Performance => {
                "Analyze performance:\n\
                 - likely bottlenecks\n\
                 - inefficient algorithms\n\
                 - memory leaks\n\
                 - unnecessary re-rendering\n\
                 - optimization opportunities\n\n"
            }
            AnalyzeMode::Review => {
                "Perform a detailed code review:\n\
                 - code quality\n\
                 - readability and maintainability\n\
                 - adherence to common practice\n\
                 - potential bugs\n\
                 - possible improvements\n\n"
            }
        }
    }
}

impl fmt::Display for AnalyzeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzeMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AnalyzeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| {
                ApiError::ConfigError(format!(
                    "Unknown analysis mode '{}' (expected one of: summary, architect, refactor, security, performance, review)",
                    s
                ))
            })
    }
}

/// A reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub description: String,
}

impl Finding {
    pub fn issue(description: impl Into<String>) -> Self {
        Self {
            severity: "medium".to_string(),
            kind: "issue".to_string(),
            file: None,
            description: description.into(),
        }
    }
}

/// A proposed improvement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub description: String,
}

impl Suggestion {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            kind: "suggestion".to_string(),
            file: None,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub findings: Vec<Finding>,
    pub suggestions: Vec<Suggestion>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.findings.is_empty() && self.suggestions.is_empty()
    }

    /// Concatenate parts in order; non-empty summaries are joined by a blank line
    pub fn merge(parts: impl IntoIterator<Item = AnalysisResult>) -> Self {
        let mut merged = AnalysisResult::default();
        let mut summaries = Vec::new();
        for part in parts {
            if !part.summary.is_empty() {
                summaries.push(part.summary);
            }
            merged.findings.extend(part.findings);
            merged.suggestions.extend(part.suggestions);
        }
        merged.summary = summaries.join("\n\n");
        merged
    }
}

/// Settings for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub mode: AnalyzeMode,
    pub query: Option<String>,
    pub paths: Vec<PathBuf>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub verbosity: u8,
    pub concurrency: Concurrency,
    /// Report destination in addition to the terminal
    pub output: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalyzeMode::default(),
            query: None,
            paths: vec![PathBuf::from(".")],
            include: None,
            exclude: None,
            verbosity: 0,
            concurrency: Concurrency::default(),
            output: None,
        }
    }
}

/// What an analysis run produced
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub files_scanned: usize,
    pub chunked: bool,
    pub result: AnalysisResult,
    pub rendered: String,
}

pub struct Analyzer {
    client: Arc<dyn GenerationClient>,
    model: String,
    config: AnalysisConfig,
    progress: Arc<dyn ProgressSink>,
}

impl Analyzer {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        model: impl Into<String>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            config,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Chunked fan-out applies to review mode with concurrency above one
    pub fn uses_chunks(&self) -> bool {
        self.config.mode == AnalyzeMode::Review && self.config.concurrency.get() > 1
    }

    pub async fn run(&self) -> Result<AnalysisReport, ApiError> {
        let started = Instant::now();
        let files = Scanner::new(ScannerConfig {
            paths: self.config.paths.clone(),
            include: self.config.include.clone(),
            exclude: self.config.exclude.clone(),
        })
        .scan()?;
        if files.is_empty() {
            return Err(ApiError::NoFilesFound(self.config.paths.clone()));
        }
        info!(files = files.len(), mode = %self.config.mode, "Scanned files for analysis");

        let runner = ChunkedAnalysisRunner::new(
            Arc::clone(&self.client),
            self.model.clone(),
            PromptBuilder::new(self.config.mode, self.config.query.clone(), self.config.verbosity),
        )
        .with_progress(Arc::clone(&self.progress));

        let chunked = self.uses_chunks();
        let result = if chunked {
            runner
                .analyze_parallel(&files, self.config.concurrency)
                .await?
        } else {
            runner.analyze_single(&files).await?
        };

        let rendered = render_report(&result, self.config.mode);
        if let Some(output) = &self.config.output {
            write_output(output, &rendered).await?;
            info!(path = %output.display(), "Wrote analysis report");
        }

        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            findings = result.findings.len(),
            "Analysis finished"
        );
        Ok(AnalysisReport {
            files_scanned: files.len(),
            chunked,
            result,
            rendered,
        })
    }
}
