use std::path::Path;

use serde::Deserialize;

use crate::error::CaptureError;

/// One result from a speech recognizer. Interim results may be revised later; only final
/// ones are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeechSegment {
    pub text: String,
    #[serde(default, alias = "isFinal")]
    pub is_final: bool,
}

impl SpeechSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Flattens a stream of recognizer segments into the single question string the solver
/// receives.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    text: String,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: &SpeechSegment) {
        if !segment.is_final {
            return;
        }
        let piece = segment.text.trim();
        if piece.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(piece);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn finish(self) -> String {
        self.text.trim().to_string()
    }
}

/// Reads a JSON-lines transcript (one segment object per line) and flattens it.
pub fn read_transcript_file(path: &Path) -> Result<String, CaptureError> {
    let raw = std::fs::read_to_string(path).map_err(|e| CaptureError::from_io(path, e))?;

    let mut acc = TranscriptAccumulator::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let seg: SpeechSegment =
            serde_json::from_str(line).map_err(|e| CaptureError::Transcript {
                line: idx + 1,
                message: e.to_string(),
            })?;
        acc.push(&seg);
    }

    log::debug!("read transcript {}", path.display());
    Ok(acc.finish())
}
