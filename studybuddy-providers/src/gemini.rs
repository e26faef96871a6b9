use crate::request::{HttpRequest, join_url};
use serde_json::{Value, json};
use studybuddy_core::types::ImagePayload;

#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Response schema asking for exactly `transcription` and `explanation`.
pub fn homework_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "transcription": {
                "type": "STRING",
                "description": "The extracted homework question text.",
            },
            "explanation": {
                "type": "STRING",
                "description": "A simple, clear, step-by-step explanation for a beginner student.",
            },
        },
        "required": ["transcription", "explanation"],
    })
}

pub fn build_image_request(cfg: &GeminiConfig, image: &ImagePayload, prompt: &str) -> HttpRequest {
    let parts = json!([
        {
            "inline_data": {
                "mime_type": image.mime_type(),
                "data": image.to_base64(),
            }
        },
        { "text": prompt },
    ]);
    build_generate_content_request(cfg, parts)
}

pub fn build_text_request(cfg: &GeminiConfig, prompt: &str) -> HttpRequest {
    build_generate_content_request(cfg, json!([{ "text": prompt }]))
}

fn build_generate_content_request(cfg: &GeminiConfig, parts: Value) -> HttpRequest {
    let url = join_url(
        &cfg.base_url,
        &format!("models/{}:generateContent", cfg.model),
    );

    let payload = json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": homework_schema(),
            "temperature": cfg.temperature,
        },
    });

    HttpRequest::post_json(
        url,
        vec![("x-goog-api-key".into(), cfg.api_key.clone())],
        payload.to_string(),
    )
}
