use std::path::PathBuf;

use thiserror::Error;

use super::code::ErrorCode;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The artifact could not be written; no partial file is left at `path`.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid output path: {0}")]
    InvalidPath(PathBuf),
}

impl RenderError {
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::RenderIoFailure
    }
}
