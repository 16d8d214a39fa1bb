//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::analysis::{AnalysisConfig, AnalyzeMode, Analyzer};
use crate::competition::{ScoringPolicy, Selector};
use crate::config::{ConfigLoader, GenfleetConfig};
use crate::credentials::{require_api_key, resolve_api_key, CredentialStore};
use crate::error::ApiError;
use crate::progress::{ConsoleProgress, NoProgress, ProgressSink, TracingProgress};
use crate::provider::{GeminiClient, GenerationClient};
use crate::scheduler::{BatchSummary, Concurrency, TaskScheduler};
use crate::tasks::{presets, Task, TaskSource};
use crate::variant::{plan_variants, Variant};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::cli::parse::{ApiCommands, Cli, Commands};
use crate::cli::presentation::{
    format_api_status, format_batch_summary, format_competition_results, format_preset_list,
    format_single_results,
};
use crate::cli::{command_name, requires_credential};

/// Effective per-run settings: configuration with CLI flags applied
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub concurrency: Concurrency,
    pub compete: bool,
    /// Model for single-variant runs and analysis
    pub model: String,
    pub variants: Vec<Variant>,
    pub extract_code: bool,
    pub scoring: ScoringPolicy,
}

impl RunOptions {
    pub fn resolve(config: &GenfleetConfig, cli: &Cli) -> Self {
        let concurrency =
            Concurrency::resolve(cli.concurrency.unwrap_or(config.execution.concurrency));
        let models = if cli.models.is_empty() {
            &config.execution.models
        } else {
            &cli.models
        };
        let model = if cli.pro {
            config.provider.pro_model.clone()
        } else {
            config.provider.model.clone()
        };

        Self {
            concurrency,
            compete: config.execution.compete && !cli.no_compete,
            model,
            variants: plan_variants(&config.provider, models, cli.pro),
            extract_code: config.execution.extract_code,
            scoring: config.execution.scoring.clone(),
        }
    }
}

/// Runtime context for CLI execution: configuration, run options, and credential access.
/// Built from the parsed CLI using ConfigLoader only.
pub struct RunContext {
    config: GenfleetConfig,
    options: RunOptions,
    api_key_flag: Option<String>,
    credentials: CredentialStore,
    progress: Arc<dyn ProgressSink>,
    client: Option<Arc<dyn GenerationClient>>,
}

impl RunContext {
    /// Create run context from the parsed CLI. Configuration errors surface here.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = cli.config {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&cli.workspace)?
        };

        if let Err(errors) = config.validate() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(ApiError::ConfigError(messages.join("; ")));
        }

        let options = RunOptions::resolve(&config, cli);
        let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
        let progress: Arc<dyn ProgressSink> = if cli.quiet {
            Arc::new(NoProgress)
        } else if log_format == "json" {
            // Structured runs keep progress in the log stream
            Arc::new(TracingProgress)
        } else {
            Arc::new(ConsoleProgress::new(config.logging.color))
        };

        Ok(Self {
            options,
            api_key_flag: cli.api_key.clone(),
            credentials: CredentialStore::default_location()?,
            progress,
            client: None,
            config,
        })
    }

    /// Use `client` instead of building one from the resolved credential
    pub fn with_client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_credential_store(mut self, credentials: CredentialStore) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        info!(command = %name, "Executing command");

        let result = self.execute_inner(command);

        debug!(
            command = %name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        // Setup errors (missing credential) surface before any unit starts
        let client = if requires_credential(command) {
            Some(self.generation_client()?)
        } else {
            None
        };

        match (command, client) {
            (Commands::FromJson { json }, Some(client)) => {
                let tasks = TaskSource::Json(json.clone()).load()?;
                self.run_batch(client, tasks)
            }
            (Commands::FromTemplate { template }, Some(client)) => {
                let tasks = TaskSource::from_template_arg(template).load()?;
                self.run_batch(client, tasks)
            }
            (Commands::List, _) => self.handle_list(),
            (
                Commands::Analyze {
                    query,
                    paths,
                    mode,
                    include,
                    exclude,
                    output,
                    verbosity,
                },
                Some(client),
            ) => {
                let config = AnalysisConfig {
                    mode: AnalyzeMode::resolve(*mode, query.as_deref()),
                    query: query.clone(),
                    paths: if paths.is_empty() {
                        vec![PathBuf::from(".")]
                    } else {
                        paths.clone()
                    },
                    include: include.clone(),
                    exclude: exclude.clone(),
                    verbosity: *verbosity,
                    concurrency: self.options.concurrency,
                    output: output.clone(),
                };
                self.handle_analyze(client, config)
            }
            (Commands::Api { command }, _) => self.handle_api_command(command),
            (_, None) => Err(ApiError::CredentialMissing),
        }
    }

    fn generation_client(&self) -> Result<Arc<dyn GenerationClient>, ApiError> {
        if let Some(client) = &self.client {
            return Ok(Arc::clone(client));
        }
        let resolved = require_api_key(self.api_key_flag.as_deref(), &self.credentials)?;
        debug!(source = %resolved.source, "Resolved API key");
        Ok(Arc::new(GeminiClient::new(resolved.key, &self.config.provider)?))
    }

    fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))
    }

    fn run_batch(
        &self,
        client: Arc<dyn GenerationClient>,
        tasks: Vec<Task>,
    ) -> Result<String, ApiError> {
        let model = self.options.model.clone();
        let scheduler = TaskScheduler::new(client, model, self.options.concurrency)
            .with_progress(Arc::clone(&self.progress))
            .with_code_extraction(self.options.extract_code)
            .with_selector(Selector::from_policy(self.options.scoring.clone()));
        let rt = Self::runtime()?;

        let (table, summary) = if self.options.compete {
            let results =
                rt.block_on(scheduler.run_competition(tasks, self.options.variants.clone()));
            (
                format_competition_results(&results),
                BatchSummary::from_results(&results),
            )
        } else {
            let results = rt.block_on(scheduler.run_single(tasks));
            (
                format_single_results(&results),
                BatchSummary::from_results(&results),
            )
        };

        Ok(format!("{}\n\n{}", table, format_batch_summary(&summary)))
    }

    fn handle_list(&self) -> Result<String, ApiError> {
        let listed = presets::names()
            .into_iter()
            .map(|name| presets::load(name).map(|tasks| (name, tasks)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format_preset_list(&listed))
    }

    fn handle_analyze(
        &self,
        client: Arc<dyn GenerationClient>,
        config: AnalysisConfig,
    ) -> Result<String, ApiError> {
        let output = config.output.clone();
        let analyzer = Analyzer::new(client, self.options.model.clone(), config)
            .with_progress(Arc::clone(&self.progress));
        let report = Self::runtime()?.block_on(analyzer.run())?;

        let mut out = report.rendered;
        if let Some(path) = output {
            out.push_str(&format!("\nReport written to {}", path.display()));
        }
        Ok(out)
    }

    fn handle_api_command(&self, command: &ApiCommands) -> Result<String, ApiError> {
        match command {
            ApiCommands::Set { key } => {
                let key = match key {
                    Some(key) => key.clone(),
                    None => dialoguer::Password::new()
                        .with_prompt("Gemini API key")
                        .interact()
                        .map_err(|e| {
                            ApiError::ConfigError(format!("Failed to read API key: {}", e))
                        })?,
                };
                self.credentials.save(&key)?;
                Ok(format!(
                    "API key saved to {}",
                    self.credentials.path().display()
                ))
            }
            ApiCommands::Delete => {
                if self.credentials.delete()? {
                    Ok("Stored API key deleted".to_string())
                } else {
                    Ok("No stored API key".to_string())
                }
            }
            ApiCommands::Status => {
                let resolved = resolve_api_key(self.api_key_flag.as_deref(), &self.credentials)?;
                Ok(format_api_status(resolved.as_ref()))
            }
        }
    }
}
