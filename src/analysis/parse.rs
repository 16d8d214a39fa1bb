//! Section-driven parsing of analysis replies.

use super::prompt::{ISSUES_HEADING, SUGGESTIONS_HEADING, SUMMARY_HEADING};
use super::{AnalysisResult, Finding, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Issues,
    Suggestions,
    Other,
}

impl Section {
    fn from_heading(heading: &str) -> Self {
        let heading = heading.trim();
        if heading.eq_ignore_ascii_case(SUMMARY_HEADING) {
            Section::Summary
        } else if heading.eq_ignore_ascii_case(ISSUES_HEADING) {
            Section::Issues
        } else if heading.eq_ignore_ascii_case(SUGGESTIONS_HEADING) {
            Section::Suggestions
        } else {
            Section::Other
        }
    }
}

/// Parse a reply laid out with the headings requested by the prompt.
///
/// When nothing is recognised the whole reply becomes the summary.
pub fn parse_response(response: &str) -> AnalysisResult {
    let mut result = AnalysisResult::default();
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut section = Section::Other;

    for line in response.lines().map(str::trim) {
        if let Some(heading) = line.strip_prefix("## ") {
            section = Section::from_heading(heading);
            continue;
        }

        match section {
            Section::Summary if !line.is_empty() => summary_lines.push(line),
            Section::Issues => {
                if let Some(description) = line.strip_prefix("- ") {
                    result.findings.push(Finding::issue(description));
                }
            }
            Section::Suggestions => {
                if let Some(description) = line.strip_prefix("- ") {
                    result.suggestions.push(Suggestion::new(description));
                }
            }
            _ => {}
        }
    }

    result.summary = summary_lines.join("\n");
    if result.is_empty() {
        result.summary = response.to_string();
    }
    result
}
