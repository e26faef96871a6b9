use crate::session::{LoadingState, MonotonicClock, SessionState, SolveOutcome, Trigger, next_screen};
use crate::traits::{ResultStore, SolverClient};
use std::future::Future;
use std::sync::Arc;
use studybuddy_core::solve::{HomeworkAnswer, SolveError, SolveKind};
use studybuddy_core::types::{
    AppScreen, ImagePayload, ScanId, ScanResult, TEXT_QUERY_PLACEHOLDER,
};
use thiserror::Error;

pub const STATUS_PROCESSING_IMAGE: &str = "Processing image...";
pub const STATUS_SOLVING: &str = "AI is solving the problem...";
pub const STATUS_ANALYZING_TEXT: &str = "Analyzing your question...";

const SAVE_WARNING: &str = "Solved, but the answer could not be saved to history.";
const SOLVE_INTERRUPTED: &str = "The request was interrupted. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("image payload is empty")]
    EmptyImage,

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("a solve request is already in progress")]
    SolveInProgress,

    #[error("cannot apply {trigger:?} on the {from} screen")]
    InvalidTransition { from: AppScreen, trigger: Trigger },
}

/// Owns the active screen and the in-flight solve.
///
/// All session state lives here and only changes through these methods. `&mut self` on the
/// async submit methods means a second solve cannot start while one is awaited. A submit
/// future dropped part-way (timeout, `select!`) settles back on home when it is dropped.
pub struct WorkflowController {
    solver: Arc<dyn SolverClient>,
    store: Arc<dyn ResultStore>,
    state: SessionState,
    clock: MonotonicClock,
}

impl WorkflowController {
    pub fn new(solver: Arc<dyn SolverClient>, store: Arc<dyn ResultStore>) -> Self {
        Self {
            solver,
            store,
            state: SessionState::default(),
            clock: MonotonicClock::system(),
        }
    }

    pub fn with_clock(mut self, clock: MonotonicClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> AppScreen {
        self.state.screen
    }

    pub fn current_result(&self) -> Option<&ScanResult> {
        self.state.current.as_ref()
    }

    pub fn raw_image(&self) -> Option<&ImagePayload> {
        self.state.raw_image.as_ref()
    }

    /// Returns and clears the message waiting to be shown to the user.
    pub fn take_notification(&mut self) -> Option<String> {
        self.state.notification.take()
    }

    fn transition(&mut self, trigger: Trigger) -> Result<AppScreen, EngineError> {
        let from = self.state.screen;
        let loading = self.state.is_loading();
        let Some(to) = next_screen(from, loading, trigger) else {
            if loading {
                return Err(EngineError::SolveInProgress);
            }
            return Err(EngineError::InvalidTransition { from, trigger });
        };

        if to != AppScreen::Editing {
            self.state.raw_image = None;
        }
        if to != AppScreen::Display {
            self.state.current = None;
        }
        self.state.screen = to;

        if from != to {
            log::info!("screen: {from} -> {to} ({trigger:?})");
        }
        Ok(to)
    }

    pub fn request_scan(&mut self) -> Result<(), EngineError> {
        self.transition(Trigger::RequestScan).map(|_| ())
    }

    pub fn capture_image(&mut self, raw: ImagePayload) -> Result<(), EngineError> {
        if raw.is_empty() {
            return Err(EngineError::EmptyImage);
        }
        self.transition(Trigger::ImageCaptured)?;
        self.state.raw_image = Some(raw);
        Ok(())
    }

    pub fn cancel_capture(&mut self) -> Result<(), EngineError> {
        self.transition(Trigger::CaptureCancelled).map(|_| ())
    }

    pub fn cancel_edit(&mut self) -> Result<(), EngineError> {
        self.transition(Trigger::EditCancelled).map(|_| ())
    }

    pub fn navigate_home(&mut self) -> Result<(), EngineError> {
        self.transition(Trigger::NavigateHome).map(|_| ())
    }

    pub fn navigate_history(&mut self) -> Result<Vec<ScanResult>, EngineError> {
        self.transition(Trigger::NavigateHistory)?;
        Ok(self.store.list())
    }

    pub fn select_history_item(&mut self, item: ScanResult) -> Result<(), EngineError> {
        self.transition(Trigger::HistoryItemSelected)?;
        self.state.current = Some(item);
        Ok(())
    }

    pub fn history(&self) -> Vec<ScanResult> {
        self.store.list()
    }

    pub fn delete_history_item(&mut self, id: &ScanId) -> anyhow::Result<()> {
        self.store.delete(id)?;
        if self.state.current.as_ref().is_some_and(|c| &c.id == id) {
            // The deleted record must not stay on screen as if it still existed.
            self.state.current = None;
            self.state.screen = AppScreen::History;
        }
        Ok(())
    }

    pub fn clear_history(&mut self) -> anyhow::Result<()> {
        self.store.clear()?;
        if self.state.current.take().is_some() {
            self.state.screen = AppScreen::History;
        }
        Ok(())
    }

    pub async fn submit_image_for_solving(
        &mut self,
        image: ImagePayload,
    ) -> Result<SolveOutcome, EngineError> {
        self.submit_image_for_solving_with_hook(image, |_status| async {})
            .await
    }

    /// Same as `submit_image_for_solving`, but reports every loading status change.
    ///
    /// The hook is intended for progress display and must be fast.
    pub async fn submit_image_for_solving_with_hook<F, Fut>(
        &mut self,
        image: ImagePayload,
        on_status: F,
    ) -> Result<SolveOutcome, EngineError>
    where
        F: Fn(&'static str) -> Fut,
        Fut: Future<Output = ()>,
    {
        if image.is_empty() {
            return Err(EngineError::EmptyImage);
        }

        let mut pending = self.begin_solve(STATUS_PROCESSING_IMAGE)?;
        on_status(STATUS_PROCESSING_IMAGE).await;

        let image_uri = image.to_data_uri();

        pending.controller.set_loading_status(STATUS_SOLVING);
        on_status(STATUS_SOLVING).await;

        let solver = Arc::clone(&pending.controller.solver);
        let res = solver.solve_image(&image).await;
        Ok(pending.finish(res, image_uri, SolveKind::Image))
    }

    pub async fn submit_text_for_solving(
        &mut self,
        text: &str,
    ) -> Result<SolveOutcome, EngineError> {
        self.submit_text_for_solving_with_hook(text, |_status| async {})
            .await
    }

    pub async fn submit_text_for_solving_with_hook<F, Fut>(
        &mut self,
        text: &str,
        on_status: F,
    ) -> Result<SolveOutcome, EngineError>
    where
        F: Fn(&'static str) -> Fut,
        Fut: Future<Output = ()>,
    {
        let question = text.trim();
        if question.is_empty() {
            return Err(EngineError::EmptyQuestion);
        }

        let pending = self.begin_solve(STATUS_ANALYZING_TEXT)?;
        on_status(STATUS_ANALYZING_TEXT).await;

        let solver = Arc::clone(&pending.controller.solver);
        let res = solver.solve_text(question).await;
        Ok(pending.finish(res, TEXT_QUERY_PLACEHOLDER.to_string(), SolveKind::Text))
    }

    fn begin_solve(&mut self, status: &'static str) -> Result<PendingSolve<'_>, EngineError> {
        self.transition(Trigger::SubmitForSolving)?;
        self.state.notification = None;
        self.state.loading = Some(LoadingState { status });
        Ok(PendingSolve {
            controller: self,
            settled: false,
        })
    }

    fn set_loading_status(&mut self, status: &'static str) {
        if let Some(loading) = self.state.loading.as_mut() {
            loading.status = status;
        }
    }

    fn finish_solve(
        &mut self,
        res: Result<HomeworkAnswer, SolveError>,
        image_uri: String,
        kind: SolveKind,
    ) -> SolveOutcome {
        match res {
            Ok(answer) => {
                let result =
                    ScanResult::from_answer(ScanId::new(), self.clock.next(), image_uri, answer);

                let warning = match self.store.save(&result) {
                    Ok(()) => None,
                    Err(e) => {
                        log::error!("failed to save scan {}: {e:#}", result.id);
                        Some(SAVE_WARNING.to_string())
                    }
                };

                self.settle(Trigger::SolveSucceeded);
                self.state.current = Some(result.clone());
                self.state.notification = warning.clone();
                SolveOutcome::Solved { result, warning }
            }
            Err(e) => {
                log::error!("solve failed ({kind:?}): {e}");
                let message = e.user_message(kind);
                self.settle(Trigger::SolveFailed);
                self.state.notification = Some(message.clone());
                SolveOutcome::Failed { message }
            }
        }
    }

    fn settle(&mut self, trigger: Trigger) {
        // Home is the only screen a pending solve can sit on, so resolution cannot fail; fall
        // back to home anyway so the user is never stuck behind a loading overlay.
        if let Err(e) = self.transition(trigger) {
            log::warn!("unexpected state when settling solve: {e}");
            self.state.screen = AppScreen::Home;
        }
        self.state.loading = None;
    }

    fn abandon_solve(&mut self) {
        log::warn!("solve dropped before it finished; returning home");
        self.settle(Trigger::SolveFailed);
        self.state.notification = Some(SOLVE_INTERRUPTED.to_string());
    }
}

/// Loading state held for one submit. Dropping it unsettled clears the overlay.
struct PendingSolve<'a> {
    controller: &'a mut WorkflowController,
    settled: bool,
}

impl PendingSolve<'_> {
    fn finish(
        mut self,
        res: Result<HomeworkAnswer, SolveError>,
        image_uri: String,
        kind: SolveKind,
    ) -> SolveOutcome {
        self.settled = true;
        self.controller.finish_solve(res, image_uri, kind)
    }
}

impl Drop for PendingSolve<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon_solve();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryResultStore;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedSolver {
        reply: Result<HomeworkAnswer, SolveError>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSolver {
        fn ok(transcription: &str, explanation: &str) -> Self {
            Self {
                reply: Ok(HomeworkAnswer {
                    transcription: transcription.into(),
                    explanation: explanation.into(),
                }),
                calls: Mutex::new(vec![]),
            }
        }

        fn failing(err: SolveError) -> Self {
            Self {
                reply: Err(err),
                calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait::async_trait]
    impl SolverClient for ScriptedSolver {
        async fn solve_image(&self, image: &ImagePayload) -> Result<HomeworkAnswer, SolveError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("image:{}", image.len()));
            self.reply.clone()
        }

        async fn solve_text(&self, question: &str) -> Result<HomeworkAnswer, SolveError> {
            self.calls.lock().unwrap().push(format!("text:{question}"));
            self.reply.clone()
        }
    }

    struct StalledSolver;

    #[async_trait::async_trait]
    impl SolverClient for StalledSolver {
        async fn solve_image(&self, _image: &ImagePayload) -> Result<HomeworkAnswer, SolveError> {
            std::future::pending().await
        }

        async fn solve_text(&self, _question: &str) -> Result<HomeworkAnswer, SolveError> {
            std::future::pending().await
        }
    }

    struct BrokenStore;

    impl ResultStore for BrokenStore {
        fn list(&self) -> Vec<ScanResult> {
            vec![]
        }
        fn save(&self, _result: &ScanResult) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
        fn delete(&self, _id: &ScanId) -> anyhow::Result<()> {
            Ok(())
        }
        fn clear(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn controller(
        solver: ScriptedSolver,
    ) -> (WorkflowController, Arc<ScriptedSolver>, Arc<MemoryResultStore>) {
        let solver = Arc::new(solver);
        let store = Arc::new(MemoryResultStore::new());
        let c = WorkflowController::new(solver.clone(), store.clone())
            .with_clock(MonotonicClock::from_fn(|| 5_000));
        (c, solver, store)
    }

    #[tokio::test]
    async fn text_solve_success_displays_and_persists() {
        let (mut c, solver, store) = controller(ScriptedSolver::ok("2+2=?", "Count up."));
        c.request_scan().unwrap();

        let out = c.submit_text_for_solving("  2+2=?  ").await.unwrap();

        let result = out.result().cloned().unwrap();
        assert_eq!(c.screen(), AppScreen::Display);
        assert!(!c.state().is_loading());
        assert_eq!(c.current_result(), Some(&result));
        assert_eq!(result.transcription, "2+2=?");
        assert_eq!(result.image_uri, TEXT_QUERY_PLACEHOLDER);
        assert_eq!(result.timestamp, 5_000);
        assert_eq!(store.list().first(), Some(&result));
        assert_eq!(solver.calls.lock().unwrap().as_slice(), ["text:2+2=?"]);
        assert!(c.take_notification().is_none());
    }

    #[tokio::test]
    async fn image_flow_goes_through_editing() {
        let (mut c, solver, store) = controller(ScriptedSolver::ok("x+1=2", "Subtract 1."));
        c.request_scan().unwrap();
        c.capture_image(ImagePayload::jpeg(vec![9; 10])).unwrap();
        assert_eq!(c.screen(), AppScreen::Editing);
        assert_eq!(c.raw_image().map(|i| i.len()), Some(10));

        let edited = ImagePayload::jpeg(vec![7; 4]);
        let out = c.submit_image_for_solving(edited.clone()).await.unwrap();

        let result = out.result().unwrap();
        assert_eq!(result.image_uri, edited.to_data_uri());
        assert_eq!(result.image(), Some(edited));
        assert!(c.raw_image().is_none());
        assert_eq!(c.screen(), AppScreen::Display);
        assert_eq!(store.list().len(), 1);
        assert_eq!(solver.calls.lock().unwrap().as_slice(), ["image:4"]);
    }

    #[tokio::test]
    async fn failed_solve_returns_home_without_saving() {
        let (mut c, _solver, store) = controller(ScriptedSolver::failing(SolveError::Transport(
            "network down".into(),
        )));
        c.request_scan().unwrap();

        let out = c.submit_text_for_solving("2+2=?").await.unwrap();

        match out {
            SolveOutcome::Failed { message } => {
                assert!(message.contains("Failed to explain the question"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(c.screen(), AppScreen::Home);
        assert!(!c.state().is_loading());
        assert!(c.current_result().is_none());
        assert!(store.list().is_empty());
        assert!(c.take_notification().unwrap().contains("Failed"));
        assert!(c.take_notification().is_none());
    }

    #[tokio::test]
    async fn hook_sees_loading_before_call() {
        let (mut c, _solver, _store) = controller(ScriptedSolver::ok("q", "a"));
        let seen = Arc::new(Mutex::new(vec![]));
        let seen_hook = seen.clone();

        c.submit_image_for_solving_with_hook(ImagePayload::jpeg(vec![1]), move |s| {
            let seen = seen_hook.clone();
            async move {
                seen.lock().unwrap().push(s);
            }
        })
        .await
        .unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [STATUS_PROCESSING_IMAGE, STATUS_SOLVING]
        );
    }

    #[tokio::test]
    async fn empty_payloads_are_rejected_without_state_change() {
        let (mut c, solver, _store) = controller(ScriptedSolver::ok("q", "a"));
        c.request_scan().unwrap();

        assert_eq!(
            c.submit_text_for_solving("   ").await.unwrap_err(),
            EngineError::EmptyQuestion
        );
        assert_eq!(
            c.submit_image_for_solving(ImagePayload::jpeg(vec![]))
                .await
                .unwrap_err(),
            EngineError::EmptyImage
        );
        assert_eq!(c.capture_image(ImagePayload::jpeg(vec![])), Err(EngineError::EmptyImage));
        assert_eq!(c.screen(), AppScreen::Capture);
        assert!(solver.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn cancel_edit_discards_raw_image() {
        let (mut c, _solver, _store) = controller(ScriptedSolver::ok("q", "a"));
        c.request_scan().unwrap();
        c.capture_image(ImagePayload::jpeg(vec![1, 2])).unwrap();
        c.cancel_edit().unwrap();
        assert_eq!(c.screen(), AppScreen::Capture);
        assert!(c.raw_image().is_none());

        c.cancel_capture().unwrap();
        assert_eq!(c.screen(), AppScreen::Home);
    }

    #[test]
    fn invalid_trigger_leaves_state_untouched() {
        let (mut c, _solver, _store) = controller(ScriptedSolver::ok("q", "a"));
        let err = c.capture_image(ImagePayload::jpeg(vec![1])).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                from: AppScreen::Home,
                trigger: Trigger::ImageCaptured
            }
        );
        assert_eq!(c.screen(), AppScreen::Home);
        assert!(c.raw_image().is_none());
    }

    #[tokio::test]
    async fn history_selection_and_home_navigation() {
        let (mut c, _solver, _store) = controller(ScriptedSolver::ok("q", "a"));
        let solved = c
            .submit_text_for_solving("q")
            .await
            .unwrap()
            .result()
            .cloned()
            .unwrap();

        let items = c.navigate_history().unwrap();
        assert_eq!(items, vec![solved.clone()]);
        assert!(c.current_result().is_none());

        c.select_history_item(items[0].clone()).unwrap();
        assert_eq!(c.screen(), AppScreen::Display);
        assert_eq!(c.current_result(), Some(&solved));

        c.navigate_home().unwrap();
        assert_eq!(c.screen(), AppScreen::Home);
        assert!(c.current_result().is_none());
    }

    #[tokio::test]
    async fn deleting_displayed_item_clears_it() {
        let (mut c, _solver, store) = controller(ScriptedSolver::ok("q", "a"));
        let out = c.submit_text_for_solving("q").await.unwrap();
        let id = out.result().unwrap().id.clone();

        c.delete_history_item(&id).unwrap();
        assert!(c.current_result().is_none());
        assert_eq!(c.screen(), AppScreen::History);
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn clearing_history_drops_displayed_item() {
        let (mut c, _solver, store) = controller(ScriptedSolver::ok("q", "a"));
        c.submit_text_for_solving("q").await.unwrap();
        assert_eq!(c.screen(), AppScreen::Display);

        c.clear_history().unwrap();
        assert!(c.current_result().is_none());
        assert_eq!(c.screen(), AppScreen::History);
        assert!(store.list().is_empty());

        c.navigate_home().unwrap();
        c.clear_history().unwrap();
        assert_eq!(c.screen(), AppScreen::Home);
    }

    #[tokio::test]
    async fn dropped_submit_settles_back_home() {
        let store = Arc::new(MemoryResultStore::new());
        let mut c = WorkflowController::new(Arc::new(StalledSolver), store.clone());
        c.request_scan().unwrap();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), c.submit_text_for_solving("q")).await;
        assert!(timed_out.is_err());

        assert!(!c.state().is_loading());
        assert_eq!(c.screen(), AppScreen::Home);
        assert_eq!(c.take_notification().as_deref(), Some(SOLVE_INTERRUPTED));
        assert!(store.list().is_empty());

        c.navigate_history().unwrap();
        c.navigate_home().unwrap();

        // A fresh submit is accepted again; it stalls rather than reporting SolveInProgress.
        let again = tokio::time::timeout(
            Duration::from_millis(50),
            c.submit_image_for_solving(ImagePayload::jpeg(vec![1])),
        )
        .await;
        assert!(again.is_err());
        assert_eq!(c.screen(), AppScreen::Home);
        assert!(!c.state().is_loading());
    }

    #[tokio::test]
    async fn save_failure_still_displays_with_warning() {
        let solver = Arc::new(ScriptedSolver::ok("q", "a"));
        let mut c = WorkflowController::new(solver, Arc::new(BrokenStore));

        let out = c.submit_text_for_solving("q").await.unwrap();
        match out {
            SolveOutcome::Solved { warning, .. } => assert_eq!(warning.as_deref(), Some(SAVE_WARNING)),
            other => panic!("expected solved, got {other:?}"),
        }
        assert_eq!(c.screen(), AppScreen::Display);
        assert_eq!(c.take_notification().as_deref(), Some(SAVE_WARNING));
    }

    #[tokio::test]
    async fn timestamps_increase_across_solves() {
        let (mut c, _solver, store) = controller(ScriptedSolver::ok("q", "a"));
        c.submit_text_for_solving("one").await.unwrap();
        c.navigate_home().unwrap();
        c.submit_text_for_solving("two").await.unwrap();

        let list = store.list();
        assert_eq!(list.len(), 2);
        assert!(list[0].timestamp > list[1].timestamp);
        assert_ne!(list[0].id, list[1].id);
    }
}
