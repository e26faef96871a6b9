use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderKind;

/// The structured reply expected from the remote solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkAnswer {
    pub transcription: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveKind {
    Image,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("API key is missing for provider `{provider}`")]
    MissingCredential { provider: ProviderKind },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("service returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl SolveError {
    /// Short message suitable for showing to the student.
    ///
    /// Details stay in the logs; only a missing credential gets its own wording because the
    /// user can fix it directly.
    pub fn user_message(&self, kind: SolveKind) -> String {
        match self {
            SolveError::MissingCredential { provider } => format!(
                "API key is missing. Run `studybuddy config --set-api-key <KEY>` or set {}.",
                provider.api_key_env_var()
            ),
            _ => match kind {
                SolveKind::Image => {
                    "Failed to analyze homework. Please try again or ensure the image is clear."
                        .into()
                }
                SolveKind::Text => "Failed to explain the question. Please try again.".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_depends_on_kind() {
        let e = SolveError::Transport("connection refused".into());
        assert!(e.user_message(SolveKind::Image).contains("analyze homework"));
        assert!(e.user_message(SolveKind::Text).contains("explain the question"));
        assert!(!e.user_message(SolveKind::Text).contains("refused"));
    }

    #[test]
    fn missing_credential_is_actionable() {
        let e = SolveError::MissingCredential {
            provider: ProviderKind::Gemini,
        };
        let msg = e.user_message(SolveKind::Image);
        assert!(msg.contains("--set-api-key"));
        assert!(msg.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn missing_credential_names_the_provider_variable() {
        let e = SolveError::MissingCredential {
            provider: ProviderKind::OpenAiCompatible,
        };
        let msg = e.user_message(SolveKind::Text);
        assert!(msg.contains("OPENAI_API_KEY"));
        assert!(!msg.contains("GEMINI_API_KEY"));
    }
}
