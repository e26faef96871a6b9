use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use studybuddy_core::types::{AppScreen, ImagePayload, ScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    RequestScan,
    ImageCaptured,
    CaptureCancelled,
    EditCancelled,
    // Edit confirmed or text/voice question submitted.
    SubmitForSolving,
    SolveSucceeded,
    SolveFailed,
    NavigateHome,
    NavigateHistory,
    HistoryItemSelected,
}

impl Trigger {
    fn settles_solve(self) -> bool {
        matches!(self, Trigger::SolveSucceeded | Trigger::SolveFailed)
    }
}

/// Screen transition table.
///
/// While a solve is loading only its resolution is accepted; resolutions are rejected
/// when nothing is loading.
pub fn next_screen(from: AppScreen, loading: bool, trigger: Trigger) -> Option<AppScreen> {
    if loading != trigger.settles_solve() {
        return None;
    }

    use studybuddy_core::types::AppScreen::*;
    match (from, trigger) {
        (Home, Trigger::RequestScan) => Some(Capture),
        (Capture, Trigger::ImageCaptured) => Some(Editing),
        (Capture, Trigger::CaptureCancelled) => Some(Home),
        (Editing, Trigger::EditCancelled) => Some(Capture),
        (_, Trigger::SubmitForSolving) => Some(Home),
        (Home, Trigger::SolveSucceeded) => Some(Display),
        (Home, Trigger::SolveFailed) => Some(Home),
        (_, Trigger::NavigateHome) => Some(Home),
        (_, Trigger::NavigateHistory) => Some(History),
        (History, Trigger::HistoryItemSelected) => Some(Display),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingState {
    pub status: &'static str,
}

/// Everything the controller tracks between user actions. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub screen: AppScreen,
    // Only present on the editing screen.
    pub raw_image: Option<ImagePayload>,
    pub loading: Option<LoadingState>,
    // Only present on the display screen.
    pub current: Option<ScanResult>,
    pub notification: Option<String>,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn loading_status(&self) -> Option<&'static str> {
        self.loading.as_ref().map(|l| l.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved {
        result: ScanResult,
        // Set when the answer could not be written to history.
        warning: Option<String>,
    },
    Failed {
        message: String,
    },
}

impl SolveOutcome {
    pub fn result(&self) -> Option<&ScanResult> {
        match self {
            SolveOutcome::Solved { result, .. } => Some(result),
            SolveOutcome::Failed { .. } => None,
        }
    }
}

pub fn unix_ms_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

/// Wall-clock milliseconds that never repeat or go backwards within one process.
pub struct MonotonicClock {
    source: Box<dyn Fn() -> i64 + Send + Sync>,
    last: i64,
}

impl MonotonicClock {
    pub fn system() -> Self {
        Self::from_fn(unix_ms_now)
    }

    pub fn from_fn(source: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
            last: i64::MIN,
        }
    }

    pub fn next(&mut self) -> i64 {
        let now = (self.source)();
        let ts = if now > self.last {
            now
        } else {
            self.last.saturating_add(1)
        };
        self.last = ts;
        ts
    }
}

impl std::fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicClock")
            .field("last", &self.last)
            .finish()
    }
}
