use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::solve::HomeworkAnswer;

/// Image reference stored for text-only questions.
pub const TEXT_QUERY_PLACEHOLDER: &str =
    "https://placehold.co/600x400/e2e8f0/475569?text=Text+Query&font=roboto";

pub const JPEG_MIME_TYPE: &str = "image/jpeg";
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(pub String);

impl ScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ScanId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ScanId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed question/answer cycle.
///
/// The serialized field names match the history layout on disk, so this struct is also the
/// storage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub id: ScanId,
    // Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub image_uri: String,
    pub transcription: String,
    pub explanation: String,
}

impl ScanResult {
    pub fn from_answer(
        id: ScanId,
        timestamp: i64,
        image_uri: impl Into<String>,
        answer: HomeworkAnswer,
    ) -> Self {
        Self {
            id,
            timestamp,
            image_uri: image_uri.into(),
            transcription: answer.transcription,
            explanation: answer.explanation,
        }
    }

    pub fn is_text_query(&self) -> bool {
        self.image_uri == TEXT_QUERY_PLACEHOLDER
    }

    /// Decodes the embedded image, if this record carries one.
    pub fn image(&self) -> Option<ImagePayload> {
        ImagePayload::from_data_uri(&self.image_uri)
    }
}

/// A JPEG-encoded still image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &JPEG_MIME_TYPE)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        JPEG_MIME_TYPE
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("{}{}", JPEG_DATA_URI_PREFIX, self.to_base64())
    }

    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let encoded = uri.strip_prefix(JPEG_DATA_URI_PREFIX)?;
        let bytes = STANDARD.decode(encoded.trim()).ok()?;
        Some(Self { bytes })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppScreen {
    #[default]
    Home,
    Capture,
    Editing,
    Display,
    History,
}

impl AppScreen {
    pub fn label(self) -> &'static str {
        match self {
            AppScreen::Home => "home",
            AppScreen::Capture => "capture",
            AppScreen::Editing => "editing",
            AppScreen::Display => "display",
            AppScreen::History => "history",
        }
    }
}

impl std::fmt::Display for AppScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
