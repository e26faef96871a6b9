use std::sync::Arc;

use studybuddy_core::config::ProviderKind;
use studybuddy_core::solve::{HomeworkAnswer, SolveError};
use studybuddy_core::types::ImagePayload;
use studybuddy_engine::traits::SolverClient;

/// Dispatches solve calls to the client registered for the active provider.
///
/// A provider with nothing registered behaves like one without a key: the call fails with
/// `MissingCredential` and never reaches the network.
#[derive(Clone)]
pub struct SolverRouter {
    active: ProviderKind,
    gemini: Option<Arc<dyn SolverClient>>,
    openai_compatible: Option<Arc<dyn SolverClient>>,
}

impl SolverRouter {
    pub fn new(active: ProviderKind) -> Self {
        Self {
            active,
            gemini: None,
            openai_compatible: None,
        }
    }

    pub fn with_gemini(mut self, client: Arc<dyn SolverClient>) -> Self {
        self.gemini = Some(client);
        self
    }

    pub fn with_openai_compatible(mut self, client: Arc<dyn SolverClient>) -> Self {
        self.openai_compatible = Some(client);
        self
    }

    fn route(&self) -> Result<&Arc<dyn SolverClient>, SolveError> {
        let slot = match self.active {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAiCompatible => &self.openai_compatible,
        };
        slot.as_ref().ok_or(SolveError::MissingCredential {
            provider: self.active,
        })
    }
}

#[async_trait::async_trait]
impl SolverClient for SolverRouter {
    async fn solve_image(&self, image: &ImagePayload) -> Result<HomeworkAnswer, SolveError> {
        self.route()?.solve_image(image).await
    }

    async fn solve_text(&self, question: &str) -> Result<HomeworkAnswer, SolveError> {
        self.route()?.solve_text(question).await
    }
}
