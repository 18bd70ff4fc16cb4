use std::path::PathBuf;

use thiserror::Error;

use crate::detection::infrastructure::model_resolver::ModelResolveError;

/// Failures surfaced by the redaction pipeline.
///
/// Raised where they are detected and passed up unchanged; only the entry
/// point presents them.
#[derive(Error, Debug)]
pub enum RedactError {
    #[error("file {} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("could not read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("could not write {}: {source}", path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("blurring failed: {0}")]
    Blur(String),
    #[error(transparent)]
    Model(#[from] ModelResolveError),
}

impl RedactError {
    pub fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io_write(path: impl Into<PathBuf>, source: impl ToString) -> Self {
        Self::IoWrite {
            path: path.into(),
            source: source.to_string().into(),
        }
    }
}
