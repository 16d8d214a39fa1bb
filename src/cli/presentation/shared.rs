//! Shared presentation: preset listing and credential status.

use crate::credentials::ResolvedKey;
use crate::tasks::Task;

pub fn format_preset_list(presets: &[(&str, Vec<Task>)]) -> String {
    if presets.is_empty() {
        return "No presets available.".to_string();
    }
    let mut lines = vec!["Available presets:".to_string()];
    for (name, tasks) in presets {
        lines.push(format!("  {} ({} task(s))", name, tasks.len()));
        for task in tasks {
            lines.push(format!("    - {} -> {}", task.file_name, task.output_path.display()));
        }
    }
    lines.join("\n")
}

pub fn format_api_status(resolved: Option<&ResolvedKey>) -> String {
    match resolved {
        Some(resolved) => format!(
            "API key: configured via {}\nKey: {}",
            resolved.source,
            resolved.masked()
        ),
        None => "API key: not configured".to_string(),
    }
}
