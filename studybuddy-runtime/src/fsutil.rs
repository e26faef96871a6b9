use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;

pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(path).with_context(|| format!("failed to create dir: {}", path.display()))
}

/// Replaces `dst` with `bytes` so readers see either the old or the new content, never a
/// partial write.
///
/// The temp file lives next to `dst` so the final rename stays on one filesystem.
pub fn write_atomic(dst: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let parent = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("failed to write temp file for {}", dst.display()))?;
    tmp.as_file().sync_all().ok();

    // On error the temp file is dropped and removed.
    tmp.persist(dst)
        .map_err(|e| anyhow::Error::new(e.error))
        .with_context(|| format!("failed to replace {}", dst.display()))?;
    Ok(())
}

/// Removes `path`; a file that is already gone counts as removed.
pub fn remove_if_exists(path: &Path) -> anyhow::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(e))
            .with_context(|| format!("failed to remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        write_atomic(&path, b"[1]").unwrap();
        write_atomic(&path, b"[2]").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"[2]");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        remove_if_exists(&dir.path().join("absent")).unwrap();
    }
}
