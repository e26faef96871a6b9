use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use studybuddy_capture::{CaptureError, ImageAdjustments, load_still};
use studybuddy_core::config::{AppConfig, ProviderKind};
use studybuddy_core::types::{ScanId, ScanResult};
use studybuddy_engine::controller::{EngineError, WorkflowController};
use studybuddy_engine::session::{SessionState, SolveOutcome, Trigger};
use studybuddy_runtime::config_store::ConfigStore;
use studybuddy_runtime::runtime_engine::build_controller_from_config;
use studybuddy_runtime::secrets::{
    SecretKey, delete_secret, env_api_key_with, get_secret, set_secret,
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("another request is still running")]
    Busy,

    #[error("no history entry with id {0}")]
    NotFound(ScanId),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    /// One line suitable for a status bar or toast.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Busy => "Still working on the previous question. Please wait.".into(),
            ServiceError::NotFound(_) => "That history entry no longer exists.".into(),
            ServiceError::Capture(e) => user_facing_capture_error(e),
            ServiceError::Engine(EngineError::EmptyQuestion) => {
                "Please type or dictate a question first.".into()
            }
            ServiceError::Engine(EngineError::EmptyImage) => {
                "The image is empty. Please pick another photo.".into()
            }
            ServiceError::Engine(e) => e.to_string(),
            ServiceError::Other(e) => format!("Something went wrong: {e}"),
        }
    }
}

pub fn user_facing_capture_error(e: &CaptureError) -> String {
    // Keep messages actionable and short; details are in logs.
    const FALLBACK: &str = "You can type your question instead.";
    match e {
        CaptureError::NotFound(p) => format!("Could not find {}. {FALLBACK}", p.display()),
        CaptureError::PermissionDenied(p) => {
            format!("Permission denied reading {}. {FALLBACK}", p.display())
        }
        CaptureError::Unsupported(_) | CaptureError::Decode(_) => {
            format!("That file is not an image we can read. {FALLBACK}")
        }
        CaptureError::Transcript { line, .. } => {
            format!("The dictation file is malformed (line {line}). {FALLBACK}")
        }
        CaptureError::Encode(_) | CaptureError::Io { .. } => {
            format!("Could not prepare the image. {FALLBACK}")
        }
    }
}

/// Facade used by front ends: config, secrets, and serialized access to one controller.
///
/// Controller operations never queue. If a solve is in flight, every other controller call
/// fails fast with `ServiceError::Busy`.
#[derive(Clone)]
pub struct AppService {
    config_store: ConfigStore,
    controller: Arc<tokio::sync::Mutex<WorkflowController>>,
}

impl AppService {
    pub fn new(config_path: PathBuf) -> anyhow::Result<Self> {
        let config_store = ConfigStore::at_path(config_path);
        let cfg = config_store.load_or_default()?;
        let controller = build_controller_from_config(&cfg, config_store.dir());
        Ok(Self::with_controller(config_store, controller))
    }

    pub fn with_controller(config_store: ConfigStore, controller: WorkflowController) -> Self {
        Self {
            config_store,
            controller: Arc::new(tokio::sync::Mutex::new(controller)),
        }
    }

    fn controller(
        &self,
    ) -> Result<tokio::sync::MutexGuard<'_, WorkflowController>, ServiceError> {
        self.controller.try_lock().map_err(|_| ServiceError::Busy)
    }

    pub fn config_path(&self) -> &Path {
        self.config_store.path()
    }

    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        self.config_store.load_or_default()
    }

    /// Persists `cfg`. The running controller keeps the solver it was built with.
    pub fn save_config(&self, cfg: &AppConfig) -> anyhow::Result<()> {
        self.config_store.save(cfg)
    }

    pub fn set_api_key(&self, provider: ProviderKind, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(anyhow::anyhow!("API key must not be empty"));
        }
        set_secret(SecretKey::for_provider(provider), value)
    }

    /// True when the environment or the keyring holds a key for `provider`.
    pub fn get_api_key_present(&self, provider: ProviderKind) -> anyhow::Result<bool> {
        let key = SecretKey::for_provider(provider);
        if env_api_key_with(key, |name| std::env::var(name).ok()).is_some() {
            return Ok(true);
        }
        Ok(get_secret(key)?.is_some_and(|v| !v.trim().is_empty()))
    }

    pub fn clear_api_keys(&self) -> anyhow::Result<()> {
        delete_secret(SecretKey::GeminiApiKey)?;
        delete_secret(SecretKey::OpenAiCompatibleApiKey)
    }

    pub fn snapshot(&self) -> Result<SessionState, ServiceError> {
        Ok(self.controller()?.state().clone())
    }

    pub fn take_notification(&self) -> Result<Option<String>, ServiceError> {
        Ok(self.controller()?.take_notification())
    }

    pub fn request_scan(&self) -> Result<(), ServiceError> {
        Ok(self.controller()?.request_scan()?)
    }

    pub fn cancel_capture(&self) -> Result<(), ServiceError> {
        Ok(self.controller()?.cancel_capture()?)
    }

    pub fn cancel_edit(&self) -> Result<(), ServiceError> {
        Ok(self.controller()?.cancel_edit()?)
    }

    pub fn navigate_home(&self) -> Result<(), ServiceError> {
        Ok(self.controller()?.navigate_home()?)
    }

    pub fn navigate_history(&self) -> Result<Vec<ScanResult>, ServiceError> {
        Ok(self.controller()?.navigate_history()?)
    }

    /// Loads a still from disk and moves the controller to the editing screen.
    pub fn capture_image_file(&self, path: &Path) -> Result<(), ServiceError> {
        let cfg = self.load_config()?;
        let mut controller = self.controller()?;
        let image = load_still(path, cfg.capture.capture_jpeg_quality)?;
        Ok(controller.capture_image(image)?)
    }

    /// Applies `adjustments` to the captured image and sends it for solving.
    pub async fn confirm_edit<F, Fut>(
        &self,
        adjustments: ImageAdjustments,
        on_status: F,
    ) -> Result<SolveOutcome, ServiceError>
    where
        F: Fn(&'static str) -> Fut + Send + Sync,
        Fut: Future<Output = ()> + Send,
    {
        let cfg = self.load_config()?;
        let mut controller = self.controller()?;

        let Some(raw) = controller.raw_image().cloned() else {
            return Err(EngineError::InvalidTransition {
                from: controller.screen(),
                trigger: Trigger::SubmitForSolving,
            }
            .into());
        };
        let edited = adjustments.apply(&raw, cfg.capture.edit_jpeg_quality)?;

        Ok(controller
            .submit_image_for_solving_with_hook(edited, on_status)
            .await?)
    }

    /// One-shot scan: capture from `path`, edit, solve.
    pub async fn solve_image_file<F, Fut>(
        &self,
        path: &Path,
        adjustments: ImageAdjustments,
        on_status: F,
    ) -> Result<SolveOutcome, ServiceError>
    where
        F: Fn(&'static str) -> Fut + Send + Sync,
        Fut: Future<Output = ()> + Send,
    {
        {
            let mut controller = self.controller()?;
            controller.navigate_home()?;
            controller.request_scan()?;
        }

        if let Err(e) = self.capture_image_file(path) {
            log::warn!("capture failed for {}: {e}", path.display());
            // Leave the user on home rather than an empty capture screen.
            if let Ok(mut controller) = self.controller() {
                let _ = controller.cancel_capture();
            }
            return Err(e);
        }

        self.confirm_edit(adjustments, on_status).await
    }

    pub async fn solve_text<F, Fut>(
        &self,
        text: &str,
        on_status: F,
    ) -> Result<SolveOutcome, ServiceError>
    where
        F: Fn(&'static str) -> Fut + Send + Sync,
        Fut: Future<Output = ()> + Send,
    {
        let mut controller = self.controller()?;
        Ok(controller
            .submit_text_for_solving_with_hook(text, on_status)
            .await?)
    }

    pub fn history(&self) -> Result<Vec<ScanResult>, ServiceError> {
        Ok(self.controller()?.history())
    }

    pub fn find_history_item(&self, id: &ScanId) -> Result<ScanResult, ServiceError> {
        self.history()?
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))
    }

    pub fn select_history_item(&self, id: &ScanId) -> Result<ScanResult, ServiceError> {
        let mut controller = self.controller()?;
        let item = controller
            .history()
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        controller.select_history_item(item.clone())?;
        Ok(item)
    }

    pub fn delete_history_item(&self, id: &ScanId) -> Result<(), ServiceError> {
        Ok(self.controller()?.delete_history_item(id)?)
    }

    pub fn clear_history(&self) -> Result<(), ServiceError> {
        Ok(self.controller()?.clear_history()?)
    }
}
