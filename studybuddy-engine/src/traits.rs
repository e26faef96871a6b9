use async_trait::async_trait;
use studybuddy_core::solve::{HomeworkAnswer, SolveError};
use studybuddy_core::types::{ImagePayload, ScanId, ScanResult};

/// Remote service turning a question into a transcription/explanation pair.
///
/// Each call is a single request/response exchange: no streaming, no retry.
#[async_trait]
pub trait SolverClient: Send + Sync {
    async fn solve_image(&self, image: &ImagePayload) -> Result<HomeworkAnswer, SolveError>;
    async fn solve_text(&self, question: &str) -> Result<HomeworkAnswer, SolveError>;
}

/// Durable newest-first collection of completed scans.
pub trait ResultStore: Send + Sync {
    /// Never fails: unreadable storage reads as an empty history.
    fn list(&self) -> Vec<ScanResult>;
    fn save(&self, result: &ScanResult) -> anyhow::Result<()>;
    /// Deleting an unknown id is a no-op.
    fn delete(&self, id: &ScanId) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}
