use std::path::PathBuf;

use thiserror::Error;

use crate::model::CombinationId;

/// Broad class of a failure, used by callers to pick a response status.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Empty or malformed input.
    Validation,
    /// Unknown id or combo text.
    NotFound,
    /// Combo text already taken.
    Conflict,
    /// The document is in a state the operation cannot run from.
    Precondition,
    /// Reading or writing the state file failed.
    Persistence,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown audio type '{0}'")]
pub struct UnknownAudioKind(pub String);

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Combo is required")]
    ComboRequired,
    #[error("Combo already exists")]
    DuplicateCombo,
    #[error("Combo not found")]
    ComboNotFound,
    #[error("Not found")]
    CombinationNotFound(CombinationId),
    #[error("No active combinations")]
    NoActiveCombinations,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ComboRequired => ErrorKind::Validation,
            CoreError::DuplicateCombo => ErrorKind::Conflict,
            CoreError::ComboNotFound | CoreError::CombinationNotFound(_) => ErrorKind::NotFound,
            CoreError::NoActiveCombinations => ErrorKind::Precondition,
            CoreError::Store(_) => ErrorKind::Persistence,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
