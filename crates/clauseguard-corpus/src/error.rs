use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("training directory not found: {0}")]
    CorpusNotFound(PathBuf),

    #[error("document unreadable: {path}: {reason}")]
    DocumentUnreadable { path: PathBuf, reason: String },

    #[error("legacy conversion failed for {path}: {reason}")]
    Conversion { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorpusError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DocumentUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn conversion(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Conversion {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
