//! Error types and handling for the SVG upload sanitization library

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for sanitization operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for sanitization operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Upload rejected: {0}")]
    UploadError(#[from] UploadError),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Rejection reasons surfaced by the upload guard.
///
/// The sanitizer itself only produces a boolean verdict; the guard picks
/// which of these the uploading user sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadError {
    #[error("Invalid file type. Only SVG files are allowed.")]
    InvalidFileType,

    #[error("SVG file exceeds maximum size limit of 5MB.")]
    ExceedsSizeLimit,

    #[error("SVG file contains dangerous content.")]
    DangerousContent,

    #[error("Invalid file path.")]
    InvalidFilePath,

    /// Post-insert rejection. Unlike the upload-time rejections this is a
    /// request-terminating failure, since the content may already be
    /// referenced elsewhere.
    #[error("SVG file contains dangerous content.")]
    Forbidden,
}

impl UploadError {
    /// HTTP status class the host should map this rejection to.
    pub fn http_status(&self) -> u16 {
        match self {
            UploadError::Forbidden => 403,
            _ => 400,
        }
    }

    /// Whether this rejection must terminate the whole request.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, UploadError::Forbidden)
    }
}
