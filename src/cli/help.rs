//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{ApiCommands, Commands};

/// Command name string for log records (e.g. "from_json", "api.status").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::FromJson { .. } => "from_json".to_string(),
        Commands::FromTemplate { .. } => "from_template".to_string(),
        Commands::List => "list".to_string(),
        Commands::Analyze { .. } => "analyze".to_string(),
        Commands::Api { command } => format!("api.{}", api_command_name(command)),
    }
}

pub fn api_command_name(command: &ApiCommands) -> &'static str {
    match command {
        ApiCommands::Set { .. } => "set",
        ApiCommands::Delete => "delete",
        ApiCommands::Status => "status",
    }
}

/// Whether the command calls the generation service and so needs a credential
pub fn requires_credential(command: &Commands) -> bool {
    matches!(
        command,
        Commands::FromJson { .. } | Commands::FromTemplate { .. } | Commands::Analyze { .. }
    )
}
