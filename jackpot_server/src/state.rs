use std::path::{Path, PathBuf};
use std::sync::Arc;

use jackpot_core::{CoreResult, StateDocument, StateStore};

use crate::error::AppError;

/// Shared handle given to every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<StateStore>,
    uploads_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: StateStore, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(store),
            uploads_dir: Arc::new(uploads_dir.into()),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Run one read-modify-write of the state file on the blocking pool.
    pub async fn transact<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut StateDocument) -> CoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        Ok(tokio::task::spawn_blocking(move || store.update(f)).await??)
    }

    pub async fn read<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&StateDocument) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let doc = tokio::task::spawn_blocking(move || store.load())
            .await?
            .map_err(jackpot_core::CoreError::from)?;
        Ok(f(&doc))
    }
}
