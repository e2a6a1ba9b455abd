use std::path::PathBuf;
use thiserror::Error;

use crate::item::Item;

#[derive(Error, Debug)]
pub enum FexError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to load {path}: {reason}")]
    LoadingFailure { path: PathBuf, reason: String },

    #[error("Failed to remove {} of {} item(s)", failed.len(), removed.len() + failed.len())]
    RemovalFailure { removed: Vec<Item>, failed: Vec<Item> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FexError {
    pub(crate) fn loading(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        FexError::LoadingFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FexError>;
