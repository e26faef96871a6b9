use std::path::Path;
use std::sync::Arc;

use studybuddy_core::config::{AppConfig, ProviderKind};
use studybuddy_engine::controller::WorkflowController;
use studybuddy_engine::traits::{ResultStore, SolverClient};

use crate::history::FileResultStore;
use crate::secrets::{SecretKey, resolve_api_key};
use crate::solver::{GeminiSolver, OpenAiCompatibleSolver};
use crate::solver_router::SolverRouter;

/// Builds the solver for the configured provider.
///
/// Only the active provider is registered, and only when a key was found; otherwise the
/// router reports a missing credential on first use.
pub fn build_solver(cfg: &AppConfig, api_key: Option<String>) -> SolverRouter {
    let settings = &cfg.solver;
    let router = SolverRouter::new(settings.provider);
    let Some(key) = api_key else {
        log::info!("no API key for {}; solving will be refused", settings.provider);
        return router;
    };

    match settings.provider {
        ProviderKind::Gemini => router.with_gemini(Arc::new(GeminiSolver::new(settings, key))),
        ProviderKind::OpenAiCompatible => {
            router.with_openai_compatible(Arc::new(OpenAiCompatibleSolver::new(settings, key)))
        }
    }
}

/// Build a runnable controller from config, secrets and the data directory.
pub fn build_controller_from_config(cfg: &AppConfig, data_dir: &Path) -> WorkflowController {
    let key = resolve_api_key(SecretKey::for_provider(cfg.solver.provider));
    let solver: Arc<dyn SolverClient> = Arc::new(build_solver(cfg, key));
    let store: Arc<dyn ResultStore> = Arc::new(FileResultStore::in_dir(data_dir));

    log::debug!(
        "controller ready: provider={} model={} history={}",
        cfg.solver.provider,
        cfg.solver.model,
        data_dir.display()
    );
    WorkflowController::new(solver, store)
}
