use std::time::Duration;

use studybuddy_core::config::{ProviderKind, SolverSettings};
use studybuddy_core::prompts::{image_prompt, text_prompt};
use studybuddy_core::solve::{HomeworkAnswer, SolveError};
use studybuddy_core::types::ImagePayload;
use studybuddy_engine::traits::SolverClient;
use studybuddy_providers::gemini::{self, GeminiConfig};
use studybuddy_providers::openai_compatible::{
    ChatMessage, OpenAiCompatibleChatConfig, build_chat_completions_request,
};
use studybuddy_providers::parse::{
    parse_gemini_generate_content, parse_homework_answer, parse_openai_chat_completion,
};
use studybuddy_providers::request::HttpRequest;
use studybuddy_providers::runtime::execute_with_timeout;

// Error bodies can be whole HTML pages; keep enough to diagnose.
const MAX_ERROR_BODY_CHARS: usize = 500;

type ExtractText = fn(&[u8]) -> anyhow::Result<String>;

async fn exchange(
    req: &HttpRequest,
    timeout: Duration,
    extract: ExtractText,
) -> Result<HomeworkAnswer, SolveError> {
    log::debug!("solver request: {req:?}");

    let resp = execute_with_timeout(req, timeout)
        .await
        .map_err(|e| SolveError::Transport(format!("{e:#}")))?;

    if !resp.is_success() {
        let body: String = resp.body_text().chars().take(MAX_ERROR_BODY_CHARS).collect();
        return Err(SolveError::Service {
            status: resp.status,
            body,
        });
    }

    let text = extract(&resp.body).map_err(|e| SolveError::MalformedResponse(format!("{e:#}")))?;
    parse_homework_answer(&text).map_err(|e| SolveError::MalformedResponse(format!("{e:#}")))
}

fn require_key(api_key: &str, provider: ProviderKind) -> Result<(), SolveError> {
    if api_key.trim().is_empty() {
        return Err(SolveError::MissingCredential { provider });
    }
    Ok(())
}

#[derive(Clone)]
pub struct GeminiSolver {
    cfg: GeminiConfig,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSolver")
            .field("cfg", &self.cfg)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiSolver {
    pub fn new(settings: &SolverSettings, api_key: impl Into<String>) -> Self {
        Self {
            cfg: GeminiConfig {
                base_url: settings.base_url.clone(),
                api_key: api_key.into(),
                model: settings.model.clone(),
                temperature: settings.temperature,
            },
            timeout: Duration::from_secs(settings.request_timeout_secs.max(1)),
        }
    }
}

#[async_trait::async_trait]
impl SolverClient for GeminiSolver {
    async fn solve_image(&self, image: &ImagePayload) -> Result<HomeworkAnswer, SolveError> {
        require_key(&self.cfg.api_key, ProviderKind::Gemini)?;
        let req = gemini::build_image_request(&self.cfg, image, &image_prompt());
        exchange(&req, self.timeout, parse_gemini_generate_content).await
    }

    async fn solve_text(&self, question: &str) -> Result<HomeworkAnswer, SolveError> {
        require_key(&self.cfg.api_key, ProviderKind::Gemini)?;
        let req = gemini::build_text_request(&self.cfg, &text_prompt(question));
        exchange(&req, self.timeout, parse_gemini_generate_content).await
    }
}

#[derive(Clone)]
pub struct OpenAiCompatibleSolver {
    cfg: OpenAiCompatibleChatConfig,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatibleSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleSolver")
            .field("cfg", &self.cfg)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatibleSolver {
    pub fn new(settings: &SolverSettings, api_key: impl Into<String>) -> Self {
        Self {
            cfg: OpenAiCompatibleChatConfig {
                base_url: settings.base_url.clone(),
                api_key: api_key.into(),
                model: settings.model.clone(),
                temperature: settings.temperature,
            },
            timeout: Duration::from_secs(settings.request_timeout_secs.max(1)),
        }
    }
}

#[async_trait::async_trait]
impl SolverClient for OpenAiCompatibleSolver {
    async fn solve_image(&self, image: &ImagePayload) -> Result<HomeworkAnswer, SolveError> {
        require_key(&self.cfg.api_key, ProviderKind::OpenAiCompatible)?;
        let messages = [ChatMessage::user_with_image(image_prompt(), image)];
        let req = build_chat_completions_request(&self.cfg, &messages);
        exchange(&req, self.timeout, parse_openai_chat_completion).await
    }

    async fn solve_text(&self, question: &str) -> Result<HomeworkAnswer, SolveError> {
        require_key(&self.cfg.api_key, ProviderKind::OpenAiCompatible)?;
        let messages = [ChatMessage::user_text(text_prompt(question))];
        let req = build_chat_completions_request(&self.cfg, &messages);
        exchange(&req, self.timeout, parse_openai_chat_completion).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(provider: ProviderKind, base_url: String) -> SolverSettings {
        let mut s = SolverSettings::default();
        s.switch_provider(provider);
        s.base_url = base_url;
        s.request_timeout_secs = 5;
        s
    }

    fn gemini_body(text: &str) -> String {
        serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
            .to_string()
    }

    #[tokio::test]
    async fn gemini_text_solve_parses_structured_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_string_contains("responseSchema"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                gemini_body(r#"{"transcription":"2+2=?","explanation":"Add them: 4."}"#),
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let solver = GeminiSolver::new(&settings(ProviderKind::Gemini, server.uri()), "g-key");
        let answer = solver.solve_text("2+2=?").await.unwrap();
        assert_eq!(answer.transcription, "2+2=?");
        assert_eq!(answer.explanation, "Add them: 4.");
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let solver = GeminiSolver::new(&settings(ProviderKind::Gemini, server.uri()), " ");
        let err = solver
            .solve_image(&ImagePayload::jpeg(vec![1, 2]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SolveError::MissingCredential {
                provider: ProviderKind::Gemini
            }
        );
    }

    #[tokio::test]
    async fn non_success_status_maps_to_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let solver = GeminiSolver::new(&settings(ProviderKind::Gemini, server.uri()), "k");
        let err = solver.solve_text("q").await.unwrap_err();
        assert_eq!(
            err,
            SolveError::Service {
                status: 429,
                body: "quota exceeded".into()
            }
        );
    }

    #[tokio::test]
    async fn empty_model_text_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(gemini_body(""), "application/json"),
            )
            .mount(&server)
            .await;

        let solver = GeminiSolver::new(&settings(ProviderKind::Gemini, server.uri()), "k");
        match solver.solve_text("q").await.unwrap_err() {
            SolveError::MalformedResponse(msg) => assert!(msg.contains("No response from AI.")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 (discard) is not listening in test environments.
        let solver = GeminiSolver::new(
            &settings(ProviderKind::Gemini, "http://127.0.0.1:9".into()),
            "k",
        );
        assert!(matches!(
            solver.solve_text("q").await.unwrap_err(),
            SolveError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn openai_image_solve_sends_data_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer o-key"))
            .and(body_string_contains("data:image/jpeg;base64,AQI="))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                serde_json::json!({
                    "choices": [{ "message": {
                        "content": "{\"transcription\":\"x=?\",\"explanation\":\"x is 1.\"}"
                    } }]
                })
                .to_string(),
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let solver = OpenAiCompatibleSolver::new(
            &settings(ProviderKind::OpenAiCompatible, server.uri()),
            "o-key",
        );
        let answer = solver
            .solve_image(&ImagePayload::jpeg(vec![1, 2]))
            .await
            .unwrap();
        assert_eq!(answer.transcription, "x=?");
    }

    #[test]
    fn debug_redacts_key() {
        let s = format!(
            "{:?}",
            GeminiSolver::new(&SolverSettings::default(), "super-secret")
        );
        assert!(!s.contains("super-secret"));
    }
}
