use std::path::PathBuf;

use thiserror::Error;

/// Failures that can abort a batch run.
///
/// Reasons from capability backends are carried as strings so errors can
/// cross worker threads.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("input directory not found: {0}")]
    MissingInputDirectory(PathBuf),
    #[error("failed to list {path}: {source}")]
    ListInputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("face detection failed for {path}: {reason}")]
    Detection { path: PathBuf, reason: String },
    #[error("blurring failed for {path}: {reason}")]
    Blur { path: PathBuf, reason: String },
    #[error("failed to write {path}: {reason}")]
    OutputWrite { path: PathBuf, reason: String },
    #[error("failed to initialise image processor: {0}")]
    WorkerInit(String),
}

impl BatchError {
    /// Whether the error is local to one image, so a skip policy may
    /// continue past it. Output write failures always abort.
    pub fn is_per_image(&self) -> bool {
        matches!(self, BatchError::Detection { .. } | BatchError::Blur { .. })
    }
}
