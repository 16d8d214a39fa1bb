//! Batch presentation: per-task tables and the closing summary line.

use crate::competition::CompetitionResult;
use crate::scheduler::{BatchSummary, ExecutionResult};
use comfy_table::Table;

fn truncate(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        return first_line.to_string();
    }
    let kept: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn format_single_results(results: &[ExecutionResult]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["#", "File", "Output", "Status", "Duration"]);
    for (index, result) in results.iter().enumerate() {
        let status = match &result.outcome {
            Ok(_) => "ok".to_string(),
            Err(e) => format!("failed: {}", truncate(e, 60)),
        };
        table.add_row(vec![
            (index + 1).to_string(),
            result.task.file_name.clone(),
            result.task.output_path.display().to_string(),
            status,
            format!("{:.2}s", result.duration.as_secs_f64()),
        ]);
    }
    table.to_string()
}

pub fn format_competition_results(results: &[CompetitionResult]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["#", "File", "Winner", "Score", "Status"]);
    for (index, result) in results.iter().enumerate() {
        let (winner, score) = match result.best_outcome() {
            Some(best) => (
                best.variant.name.clone(),
                best.score.map(|s| format!("{:.2}", s)).unwrap_or_default(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        let status = match (&result.write_error, result.best) {
            (Some(e), _) => format!("write failed: {}", truncate(e, 60)),
            (None, Some(_)) => "ok".to_string(),
            (None, None) => truncate(&result.justification, 60),
        };
        table.add_row(vec![
            (index + 1).to_string(),
            result.task.file_name.clone(),
            winner,
            score,
            status,
        ]);
    }

    let mut out = table.to_string();
    for result in results {
        out.push_str(&format!("\n{}: {}", result.task.file_name, result.justification));
        for outcome in &result.outcomes {
            let detail = match (&outcome.result, outcome.score) {
                (Ok(_), Some(score)) => format!("score {:.2}", score),
                (Ok(_), None) => "empty".to_string(),
                (Err(e), _) => format!("error: {}", truncate(e, 60)),
            };
            out.push_str(&format!(
                "\n  - {} ({:.2}s): {}",
                outcome.variant.name,
                outcome.duration.as_secs_f64(),
                detail
            ));
        }
    }
    out
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    format!(
        "{} of {} task(s) succeeded, {} failed",
        summary.succeeded, summary.total, summary.failed
    )
}
