//! Analysis prompt construction.

use super::scanner::SourceFile;
use super::AnalyzeMode;
use std::fmt::Write;

/// Files whose contents are embedded in a single prompt
pub const MAX_FILES_WITH_CONTENT: usize = 10;

/// Response headings the parser understands
pub const SUMMARY_HEADING: &str = "Summary";
pub const ISSUES_HEADING: &str = "Issues";
pub const SUGGESTIONS_HEADING: &str = "Suggestions";
pub const DETAILS_HEADING: &str = "Details";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    mode: AnalyzeMode,
    query: Option<String>,
    verbosity: u8,
}

impl PromptBuilder {
    pub fn new(mode: AnalyzeMode, query: Option<String>, verbosity: u8) -> Self {
        Self {
            mode,
            query: query.filter(|q| !q.trim().is_empty()),
            verbosity,
        }
    }

    /// Source lines embedded per file
    pub fn max_lines(&self) -> usize {
        match self.verbosity {
            0 => 50,
            1 => 200,
            _ => 1000,
        }
    }

    pub fn build(&self, files: &[SourceFile]) -> String {
        let mut prompt = String::from("Analyze the following codebase.\n\n");

        match (&self.mode, &self.query) {
            (AnalyzeMode::Review, Some(query)) => {
                let _ = write!(
                    prompt,
                    "Review the code with the following focus:\n{}\n\n",
                    query
                );
            }
            (mode, query) => {
                prompt.push_str(mode.instructions());
                if let Some(query) = query {
                    let _ = write!(prompt, "Pay particular attention to: {}\n\n", query);
                }
            }
        }

        prompt.push_str("\nFiles:\n");
        for file in files {
            let _ = writeln!(
                prompt,
                "- {} ({}, {} bytes)",
                file.path.display(),
                file.language,
                file.size
            );
        }

        prompt.push_str("\n\n=== Source ===\n");
        let max_lines = self.max_lines();
        for file in files.iter().take(MAX_FILES_WITH_CONTENT) {
            let _ = write!(prompt, "\n--- {} ---\n", file.path.display());
            for (number, line) in file.content.split('\n').enumerate() {
                if number >= max_lines {
                    prompt.push_str("... (truncated)\n");
                    break;
                }
                let _ = writeln!(prompt, "{}: {}", number + 1, line);
            }
        }

        let _ = write!(
            prompt,
            "\n\nFormat the result exactly as follows:\n\n\
             ## {}\n(a short overview of the project)\n\n\
             ## {}\n- [severity] file:line - description of the problem\n\n\
             ## {}\n- [kind] file - suggested change\n\n\
             ## {}\n(detailed analysis for the requested focus)\n",
            SUMMARY_HEADING, ISSUES_HEADING, SUGGESTIONS_HEADING, DETAILS_HEADING
        );

        prompt
    }
}
