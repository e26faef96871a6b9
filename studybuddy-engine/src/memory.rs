use std::sync::Mutex;

use studybuddy_core::types::{ScanId, ScanResult};

use crate::traits::ResultStore;

/// Process-local store, for tests and sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    entries: Mutex<Vec<ScanResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<ScanResult>> {
        // A poisoned lock only means another thread panicked mid-push; the Vec is still valid.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResultStore for MemoryResultStore {
    fn list(&self) -> Vec<ScanResult> {
        self.entries().clone()
    }

    fn save(&self, result: &ScanResult) -> anyhow::Result<()> {
        self.entries().insert(0, result.clone());
        Ok(())
    }

    fn delete(&self, id: &ScanId) -> anyhow::Result<()> {
        self.entries().retain(|r| &r.id != id);
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        self.entries().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, ts: i64) -> ScanResult {
        ScanResult {
            id: ScanId::from(id),
            timestamp: ts,
            image_uri: String::new(),
            transcription: format!("q{id}"),
            explanation: format!("e{id}"),
        }
    }

    #[test]
    fn newest_first_and_idempotent_delete() {
        let store = MemoryResultStore::new();
        store.save(&record("1", 1000)).unwrap();
        store.save(&record("2", 2000)).unwrap();

        let ids: Vec<_> = store.list().into_iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec!["2", "1"]);

        store.delete(&ScanId::from("missing")).unwrap();
        assert_eq!(store.list().len(), 2);

        store.delete(&ScanId::from("1")).unwrap();
        assert_eq!(store.list(), vec![record("2", 2000)]);

        store.clear().unwrap();
        assert!(store.list().is_empty());
    }
}
