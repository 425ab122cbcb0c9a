//! Pulling pandas-style code out of free-form LLM text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:python|py)?[ \t]*\r?\n(.*?)```").expect("valid fenced block regex")
});

const CODE_MARKERS: &[&str] = &["df.", "groupby(", "import ", "result ="];

/// Code found in an LLM response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedCode {
    /// All blocks joined by a blank line.
    pub code: String,
    pub blocks: Vec<String>,
    /// `true` when the code came from fenced blocks; loose lines are shown but not analyzed.
    pub executable: bool,
}

/// Extract code from `response`.
///
/// Fenced blocks tagged `python`, `py` or untagged win. Without fences, lines that look like
/// data manipulation (`df.`, `groupby(`, `import `, `result =`) are collected instead.
pub fn extract_code(response: &str) -> Option<ExtractedCode> {
    let blocks: Vec<String> = FENCED_BLOCK
        .captures_iter(response)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    if !blocks.is_empty() {
        return Some(ExtractedCode {
            code: blocks.join("\n\n"),
            blocks,
            executable: true,
        });
    }

    let lines: Vec<&str> = response
        .lines()
        .filter(|line| CODE_MARKERS.iter().any(|m| line.contains(m)))
        .collect();
    if lines.is_empty() {
        return None;
    }
    let code = lines.join("\n");
    Some(ExtractedCode {
        blocks: vec![code.clone()],
        code,
        executable: false,
    })
}
