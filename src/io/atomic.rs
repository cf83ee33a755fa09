//! Atomic file replacement
//!
//! Writers go to `<path>.tmp`, are flushed and synced, then renamed over the
//! target. A partially written file is never observed at the target path:
//! readers see either the previous contents or the new ones.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::{PersistenceError, Result};

/// Temp file that removes itself unless committed.
#[derive(Debug)]
struct TempFile {
    path: PathBuf,
    committed: bool,
}

impl TempFile {
    fn path_for(target: &Path) -> PathBuf {
        let mut name = target.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn create(target: &Path) -> Result<(Self, File)> {
        let path = Self::path_for(target);
        let file = File::create(&path).map_err(|e| PersistenceError::io(&path, e))?;
        Ok((Self { path, committed: false }, file))
    }

    fn commit(mut self, target: &Path) -> Result<()> {
        fs::rename(&self.path, target).map_err(|e| PersistenceError::io(target, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }
}

/// Write `bytes` to `target` atomically.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic_with(target, |file| file.write_all(bytes))
}

/// Run `write` against the temp file, then sync and rename over `target`.
///
/// If `write` fails the temp file is removed and the target is untouched.
pub fn write_atomic_with<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let (guard, mut file) = TempFile::create(target)?;
    write(&mut file).map_err(|e| PersistenceError::io(&guard.path, e))?;
    file.flush().map_err(|e| PersistenceError::io(&guard.path, e))?;
    file.sync_all().map_err(|e| PersistenceError::io(&guard.path, e))?;
    drop(file);
    guard.commit(target)?;
    tracing::debug!(path = %target.display(), "Atomic write complete");
    Ok(())
}
