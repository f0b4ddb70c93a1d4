//! Error handling for Auris
//!
//! Every failure maps onto one of three coarse kinds: a bad parameter, an
//! unsupported format, or an I/O failure. Transforms validate before they
//! touch the buffer, so an error never leaves a half-updated buffer behind.

use thiserror::Error;

/// Result type alias for Auris operations
pub type Result<T> = std::result::Result<T, AurisError>;

/// Coarse classification of an [`AurisError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad cutoff, bad compression factor, bad sample rate, ragged channels
    InvalidParameter,
    /// Codec or container not recognized
    UnsupportedFormat,
    /// File unreadable or unwritable
    IoFailure,
}

/// Main error type for Auris operations
#[derive(Error, Debug)]
pub enum AurisError {
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter { param: String, reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Failed to read audio file {path}: {reason}")]
    AudioRead { path: String, reason: String },

    #[error("Failed to write audio file: {path}")]
    AudioWrite {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AurisError {
    /// Shorthand for building an `InvalidParameter` error
    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        AurisError::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Coarse error kind reported to callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            AurisError::InvalidParameter { .. } | AurisError::Serialization(_) => {
                ErrorKind::InvalidParameter
            }
            AurisError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            AurisError::FileNotFound { .. }
            | AurisError::AudioRead { .. }
            | AurisError::AudioWrite { .. }
            | AurisError::Io(_) => ErrorKind::IoFailure,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AurisError::InvalidParameter { .. } => "INVALID_PARAMETER",
            AurisError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            AurisError::FileNotFound { .. } => "FILE_NOT_FOUND",
            AurisError::AudioRead { .. } => "AUDIO_READ_ERROR",
            AurisError::AudioWrite { .. } => "AUDIO_WRITE_ERROR",
            AurisError::Io(_) => "IO_ERROR",
            AurisError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AurisError::InvalidParameter { .. } => vec![
                "Filter cutoffs must lie strictly between 0 Hz and half the sample rate",
                "Compression factors must be at least 1",
            ],
            AurisError::UnsupportedFormat { .. } => vec![
                "Readable formats: WAV, FLAC, MP3, OGG",
                "Writable formats: WAV (16-bit, 24-bit, 32-bit float)",
            ],
            AurisError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            AurisError::AudioRead { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting from source",
            ],
            AurisError::AudioWrite { .. } | AurisError::Io(_) => vec![
                "Check that the destination directory exists and is writable",
                "Free up disk space",
            ],
            AurisError::Serialization(_) => vec!["Check the pipeline file is valid JSON"],
        }
    }
}
