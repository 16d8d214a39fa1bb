//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, requires_credential};
pub use output::map_error;
pub use parse::{ApiCommands, Cli, Commands};
pub use presentation::{
    format_api_status, format_batch_summary, format_competition_results, format_preset_list,
    format_single_results,
};
pub use route::{RunContext, RunOptions};
