use std::path::PathBuf;

use thiserror::Error;

use crate::core::labels::ManifestError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Media error for {path:?}: {reason}")]
    Media { path: PathBuf, reason: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid clip: {0}")]
    InvalidClip(String),
    #[error("Inference error: {0}")]
    Inference(String),
}

impl DatasetError {
    pub fn media(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DatasetError::Media {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
