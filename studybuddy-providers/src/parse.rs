use anyhow::{Context, anyhow};
use serde::Deserialize;
use studybuddy_core::solve::HomeworkAnswer;
use studybuddy_core::text::strip_code_fences;

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// Concatenated text of the first candidate.
pub fn parse_gemini_generate_content(body: &[u8]) -> anyhow::Result<String> {
    let resp: GeminiResponse = serde_json::from_slice(body).context("decode Gemini JSON")?;
    let content = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| anyhow!("no candidates in Gemini response"))?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

pub fn parse_openai_chat_completion(body: &[u8]) -> anyhow::Result<String> {
    let resp: OpenAiChatResponse = serde_json::from_slice(body).context("decode chat JSON")?;
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow!("no content in chat completion response"))?;
    Ok(content)
}

/// Parses the model's text output into the structured answer.
pub fn parse_homework_answer(text: &str) -> anyhow::Result<HomeworkAnswer> {
    let clean = strip_code_fences(text);
    if clean.is_empty() {
        return Err(anyhow!("No response from AI."));
    }

    serde_json::from_str(&clean).context("decode homework answer JSON")
}
