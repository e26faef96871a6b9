use crate::request::{HttpRequest, join_url};
use serde_json::{Value, json};
use studybuddy_core::types::ImagePayload;

#[derive(Clone, PartialEq)]
pub struct OpenAiCompatibleChatConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl std::fmt::Debug for OpenAiCompatibleChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleChatConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatContent {
    Text(String),
    TextWithImage { text: String, image_data_uri: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: ChatContent,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: ChatContent::Text(text.into()),
        }
    }

    pub fn user_with_image(text: impl Into<String>, image: &ImagePayload) -> Self {
        Self {
            role: "user".into(),
            content: ChatContent::TextWithImage {
                text: text.into(),
                image_data_uri: image.to_data_uri(),
            },
        }
    }

    fn to_json(&self) -> Value {
        let content = match &self.content {
            ChatContent::Text(t) => json!(t),
            ChatContent::TextWithImage {
                text,
                image_data_uri,
            } => json!([
                { "type": "text", "text": text },
                { "type": "image_url", "image_url": { "url": image_data_uri } },
            ]),
        };
        json!({ "role": self.role, "content": content })
    }
}

pub fn build_chat_completions_request(
    cfg: &OpenAiCompatibleChatConfig,
    messages: &[ChatMessage],
) -> HttpRequest {
    let url = join_url(&cfg.base_url, "/chat/completions");

    let payload = json!({
        "model": cfg.model,
        "messages": messages.iter().map(ChatMessage::to_json).collect::<Vec<_>>(),
        "temperature": cfg.temperature,
        "response_format": { "type": "json_object" },
    });

    HttpRequest::post_json(
        url,
        vec![("Authorization".into(), format!("Bearer {}", cfg.api_key))],
        payload.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> OpenAiCompatibleChatConfig {
        OpenAiCompatibleChatConfig {
            base_url: "https://api.example.com/v1".into(),
            api_key: "k".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.4,
        }
    }

    #[test]
    fn builds_authorized_json_object_request() {
        let req = build_chat_completions_request(&cfg(), &[ChatMessage::user_text("hi")]);

        assert_eq!(req.method, "POST");
        assert!(req.url.ends_with("/v1/chat/completions"));
        assert_eq!(req.header("authorization"), Some("Bearer k"));

        let body: Value = serde_json::from_str(req.json_body().unwrap()).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn image_message_uses_data_uri_part() {
        let img = ImagePayload::jpeg(vec![1, 2, 3]);
        let req =
            build_chat_completions_request(&cfg(), &[ChatMessage::user_with_image("solve", &img)]);

        let body: Value = serde_json::from_str(req.json_body().unwrap()).unwrap();
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["text"], "solve");
        assert_eq!(
            content[1]["image_url"]["url"],
            "data:image/jpeg;base64,AQID"
        );
    }
}
