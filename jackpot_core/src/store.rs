use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::StateDocument;

pub const STATE_FILE_NAME: &str = "state.json";

/// Single-file JSON persistence for the [`StateDocument`].
///
/// Every write replaces the whole file. [`StateStore::update`] holds an
/// in-process lock across load, mutate and save, so two requests served by
/// the same store never interleave. Another process writing the same file is
/// not coordinated with.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Store at `<data_dir>/state.json`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. A missing or unreadable-as-JSON file is replaced by
    /// a fresh default document.
    pub fn load(&self) -> Result<StateDocument, StoreError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_locked()
    }

    pub fn save(&self, doc: &StateDocument) -> Result<(), StoreError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.save_locked(doc)
    }

    /// Load, apply `f`, and persist only if `f` succeeds.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut StateDocument) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.load_locked()?;
        let out = f(&mut doc)?;
        self.save_locked(&doc)?;
        Ok(out)
    }

    fn load_locked(&self) -> Result<StateDocument, StoreError> {
        self.ensure_parent()?;
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                debug!(path = %self.path.display(), "state file missing, seeding defaults");
                return self.reseed();
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        match serde_json::from_slice::<StateDocument>(&raw) {
            Ok(mut doc) => {
                doc.repair();
                Ok(doc)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file corrupt, replacing with defaults");
                self.reseed()
            }
        }
    }

    fn reseed(&self) -> Result<StateDocument, StoreError> {
        let doc = StateDocument::default();
        self.save_locked(&doc)?;
        Ok(doc)
    }

    fn save_locked(&self, doc: &StateDocument) -> Result<(), StoreError> {
        let dir = self.ensure_parent()?;
        let json = serde_json::to_vec_pretty(doc)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        if let Err(e) = tmp.write_all(&json) {
            return Err(StoreError::io(tmp.path(), e));
        }
        if let Err(e) = tmp.as_file().sync_all() {
            return Err(StoreError::io(tmp.path(), e));
        }
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }

    fn ensure_parent(&self) -> Result<PathBuf, StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(dir)
    }
}
