//! Response post-processing: pull generated code out of a chat-style reply.

use regex::Regex;
use std::sync::OnceLock;

fn fenced_block() -> &'static Regex {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    FENCED.get_or_init(|| {
        Regex::new(r"```(?:typescript|tsx|ts|jsx|js)?\n([\s\S]*?)```")
            .expect("fenced block pattern is valid")
    })
}

/// Return the body of the first fenced code block, trimmed; the whole reply
/// (trimmed) when there is none.
pub fn extract_code_block(response: &str) -> String {
    fenced_block()
        .captures(response)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .unwrap_or(response)
        .trim()
        .to_string()
}
