use chrono::{DateTime, Local};
use studybuddy_core::text::{question_preview, share_text};
use studybuddy_core::types::ScanResult;

const PREVIEW_CHARS: usize = 60;

/// Local date and time for a millisecond Unix timestamp.
pub fn format_timestamp(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(utc) => utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown date".into(),
    }
}

pub fn history_row(result: &ScanResult) -> String {
    format!(
        "{}  {}  {}",
        result.id,
        format_timestamp(result.timestamp),
        question_preview(&result.transcription, PREVIEW_CHARS)
    )
}

/// Short label for menus, where the id would be noise.
pub fn history_label(result: &ScanResult) -> String {
    format!(
        "{}  {}",
        format_timestamp(result.timestamp),
        question_preview(&result.transcription, PREVIEW_CHARS)
    )
}

pub fn render_result(result: &ScanResult) -> String {
    let source = match result.image() {
        Some(img) => format!("photo, {} KB", img.len().div_ceil(1024)),
        None if result.is_text_query() => "typed question".into(),
        None => "image unavailable".into(),
    };

    format!(
        "{}\n\n[{} | {} | id {}]",
        share_text(result),
        source,
        format_timestamp(result.timestamp),
        result.id
    )
}
