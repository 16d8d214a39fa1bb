//! Plain-text rendering of analysis results.

use super::{AnalysisResult, AnalyzeMode};
use std::collections::BTreeMap;
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

fn severity_marker(severity: &str) -> &'static str {
    match severity {
        "critical" => "[!!!]",
        "high" => "[!!]",
        "medium" => "[!]",
        "low" => "[.]",
        _ => "[?]",
    }
}

/// Render `result` as the text printed to the terminal and written to `--output`
pub fn render_report(result: &AnalysisResult, mode: AnalyzeMode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analysis ({})", mode);
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    if mode == AnalyzeMode::Review && !result.findings.is_empty() {
        let _ = writeln!(out, "\nReview findings ({}):", result.findings.len());
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');

        let mut by_kind: BTreeMap<&str, Vec<_>> = BTreeMap::new();
        for finding in &result.findings {
            let kind = if finding.kind.is_empty() {
                "general"
            } else {
                finding.kind.as_str()
            };
            by_kind.entry(kind).or_default().push(finding);
        }
        for (kind, findings) in by_kind {
            let _ = writeln!(out, "\n{}:", kind);
            for finding in findings {
                match &finding.file {
                    Some(file) => {
                        let _ = writeln!(
                            out,
                            "{} {} {}: {}",
                            severity_marker(&finding.severity),
                            finding.severity,
                            file,
                            finding.description
                        );
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "{} {}: {}",
                            severity_marker(&finding.severity),
                            finding.severity,
                            finding.description
                        );
                    }
                }
            }
        }
    } else if !result.findings.is_empty() {
        let _ = writeln!(out, "\nIssues ({}):", result.findings.len());
        for finding in &result.findings {
            let _ = writeln!(
                out,
                "{} [{}] {}",
                severity_marker(&finding.severity),
                finding.kind,
                finding.description
            );
        }
    }

    if !result.suggestions.is_empty() {
        let _ = writeln!(out, "\nSuggestions ({}):", result.suggestions.len());
        for suggestion in &result.suggestions {
            let _ = writeln!(out, "* [{}] {}", suggestion.kind, suggestion.description);
        }
    }

    if !result.summary.is_empty() {
        out.push_str("\nSummary:\n");
        out.push_str(&result.summary);
        out.push('\n');
    }

    out
}
