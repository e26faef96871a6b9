use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use studybuddy_core::types::{ScanId, ScanResult};
use studybuddy_engine::traits::ResultStore;

use crate::fsutil::{remove_if_exists, write_atomic};

pub const HISTORY_FILE_NAME: &str = "study_buddy_history_v1.json";

/// Result store backed by a single JSON array on disk, newest first.
///
/// Every mutation rewrites the whole file. The mutex only serializes writers inside this
/// process; it does not guard against other processes sharing the file.
#[derive(Debug)]
pub struct FileResultStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileResultStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::at_path(dir.join(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<Vec<ScanResult>> {
        match self.read_raw()? {
            Some(raw) => self.parse(&raw),
            None => Ok(vec![]),
        }
    }

    /// `None` when there is nothing stored yet.
    fn read_raw(&self) -> anyhow::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e))
                .with_context(|| format!("failed to read history: {}", self.path.display())),
        }
    }

    fn parse(&self, raw: &str) -> anyhow::Result<Vec<ScanResult>> {
        serde_json::from_str(raw)
            .with_context(|| format!("failed to parse history: {}", self.path.display()))
    }

    /// Entries to rewrite on a mutation.
    ///
    /// Unparseable content is replaced, but a file that cannot be read is left alone and the
    /// mutation fails.
    fn load_for_update(&self) -> anyhow::Result<Vec<ScanResult>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(vec![]);
        };
        match self.parse(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("discarding corrupt history: {e:#}");
                Ok(vec![])
            }
        }
    }

    fn write(&self, entries: &[ScanResult]) -> anyhow::Result<()> {
        let json = serde_json::to_vec(entries).context("encode history JSON")?;
        write_atomic(&self.path, &json)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResultStore for FileResultStore {
    fn list(&self) -> Vec<ScanResult> {
        match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("history unreadable, treating as empty: {e:#}");
                vec![]
            }
        }
    }

    fn save(&self, result: &ScanResult) -> anyhow::Result<()> {
        let _guard = self.lock();
        let mut entries = self.load_for_update()?;
        entries.insert(0, result.clone());
        self.write(&entries)
    }

    fn delete(&self, id: &ScanId) -> anyhow::Result<()> {
        let _guard = self.lock();
        let mut entries = self.load_for_update()?;
        let before = entries.len();
        entries.retain(|r| &r.id != id);
        if entries.len() == before {
            return Ok(());
        }
        self.write(&entries)
    }

    fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.lock();
        remove_if_exists(&self.path)
    }
}
