//! Error types for MIME-type validation configuration.
//!
//! Validation *outcomes* (file not matching policy, file unreadable) are not
//! errors; they surface as a `false` result plus a reason code on the
//! validator. The variants here cover configuration mistakes only, which fail
//! immediately at the point the bad value is supplied.

use std::path::PathBuf;

/// Result type for validator configuration operations.
pub type Result<T> = std::result::Result<T, MimeTypeError>;

/// Errors raised while configuring a [`crate::MimeTypeValidator`].
#[derive(Debug, thiserror::Error)]
pub enum MimeTypeError {
    /// Magic file path does not exist or is not readable
    #[error("Magic file {path:?} could not be read: {reason}")]
    InvalidArgument { path: PathBuf, reason: String },

    /// Magic file contents rejected by the detection backend
    #[error("Magic file {path:?} could not be used by the mime detector: {reason}")]
    InvalidMagicMimeFile { path: PathBuf, reason: String },

    /// Options mapping was missing required entries or malformed
    #[error("Invalid validator options: {message}")]
    InvalidOptions { message: String },
}
