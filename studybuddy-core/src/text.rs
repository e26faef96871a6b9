use regex::Regex;
use std::sync::OnceLock;

use crate::types::ScanResult;

pub const UNKNOWN_QUESTION: &str = "Unknown Question";

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Models sometimes wrap JSON in markdown fences even when asked for a JSON mime type.
        // Markers are removed wherever they appear, not only at the edges.
        Regex::new(r"(?i)```(?:json)?").expect("valid code fence regex")
    })
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

pub fn strip_code_fences(text: &str) -> String {
    code_fence_re().replace_all(text, "").trim().to_string()
}

/// One-line preview of a question for list views.
pub fn question_preview(transcription: &str, max_chars: usize) -> String {
    let flat = whitespace_re().replace_all(transcription.trim(), " ");
    if flat.is_empty() {
        return UNKNOWN_QUESTION.into();
    }

    if flat.chars().count() <= max_chars {
        return flat.into_owned();
    }

    let mut out: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Plain-text rendering used for copy/share.
pub fn share_text(result: &ScanResult) -> String {
    format!(
        "Question: {}\n\nExplanation:\n{}",
        result.transcription, result.explanation
    )
}
