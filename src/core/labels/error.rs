use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Cannot read manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Manifest shape error: {0}")]
    Shape(String),
}
