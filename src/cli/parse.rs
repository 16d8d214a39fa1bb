//! CLI parse: clap types for genfleet. No behavior; definitions only.

use crate::analysis::AnalyzeMode;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// genfleet - run generation tasks in parallel and keep the best variant
#[derive(Parser, Debug)]
#[command(name = "genfleet")]
#[command(about = "Run code-generation tasks in parallel, optionally as competitions between variants")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Maximum tasks in flight (values <= 0 use the default of 5)
    #[arg(short = 'c', long, global = true, allow_negative_numbers = true)]
    pub concurrency: Option<i64>,

    /// API key (overrides the stored credential and GEMINI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Disable competition mode: one call per task
    #[arg(long, global = true)]
    pub no_compete: bool,

    /// Comma-separated model names to compete (default: one model, three sampling modes)
    #[arg(long, global = true, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Use the pro model
    #[arg(long, global = true)]
    pub pro: bool,

    /// Workspace root directory
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging and progress output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run tasks given as a JSON array
    FromJson {
        /// JSON array of {"fileName", "outputPath", "prompt"} objects
        json: String,
    },
    /// Run tasks from a built-in preset or a JSON file
    FromTemplate {
        /// Preset name, or path to a .json task file
        template: String,
    },
    /// List built-in presets
    List,
    /// Analyze a codebase
    Analyze {
        /// Free-form review focus; selects review mode unless --mode is given
        query: Option<String>,

        /// Paths to scan (default: current directory)
        paths: Vec<PathBuf>,

        /// Analysis mode (summary, architect, refactor, security, performance, review)
        #[arg(long, value_parser = parse_mode)]
        mode: Option<AnalyzeMode>,

        /// Only analyze files matching this glob (e.g. "**/*.ts")
        #[arg(long)]
        include: Option<String>,

        /// Skip entries matching this glob
        #[arg(long)]
        exclude: Option<String>,

        /// Also write the report to this file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Source detail per file (-v: 200 lines, -vv: 1000 lines)
        #[arg(short = 'v', long = "detail", action = ArgAction::Count)]
        verbosity: u8,
    },
    /// Manage the stored API key
    Api {
        #[command(subcommand)]
        command: ApiCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ApiCommands {
    /// Store an API key (prompts when omitted)
    Set {
        key: Option<String>,
    },
    /// Remove the stored API key
    Delete,
    /// Show where the API key comes from
    Status,
}

fn parse_mode(raw: &str) -> Result<AnalyzeMode, String> {
    raw.parse::<AnalyzeMode>().map_err(|e| e.to_string())
}
