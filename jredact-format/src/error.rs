//! Error types for jredact

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit status for a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Invalid combination of command-line options, or an unusable setting.
pub const EXIT_CONFIG: u8 = 1;
/// Input file or key file does not exist.
pub const EXIT_NOT_FOUND: u8 = 2;
/// The input stream is not a valid JSON array of redactable elements.
pub const EXIT_MALFORMED: u8 = 3;

/// Which user-supplied file a [`RedactError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// The JSON document being redacted.
    Input,
    /// The file listing sensitive keys.
    Key,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Input => f.write_str("Input"),
            FileKind::Key => f.write_str("Key"),
        }
    }
}

/// A sensitive value that hash mode cannot digest because it is not a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value under key '{key}' is {found}; only strings can be hashed")]
pub struct UnhashableValue {
    /// Key whose value was rejected, as spelled in the document.
    pub key: String,
    /// JSON type name of the rejected value.
    pub found: &'static str,
}

/// jredact error types
#[derive(Debug, Error)]
pub enum RedactError {
    /// Options were missing, conflicting, or outside their allowed range.
    #[error("{0}")]
    Config(String),
    /// A user-supplied path does not resolve to a file.
    #[error("{kind} file {} not found.", .path.display())]
    NotFound {
        /// Which file was missing
        kind: FileKind,
        /// Path as given by the user
        path: PathBuf,
    },
    /// The byte stream is not a well-formed top-level array of elements.
    #[error("The JSON provided is invalid. Invalid object index: {index}\n{reason}")]
    MalformedInput {
        /// 0-based index of the element being decoded
        index: usize,
        /// Decoder diagnostic; may quote unredacted input
        reason: String,
    },
    /// Hash mode met a sensitive key whose value is not a string.
    #[error("The JSON provided may be invalid. Invalid object index: {index}\n{source}")]
    TypeMismatch {
        /// 0-based index of the offending element
        index: usize,
        /// Key and value type that could not be hashed
        source: UnhashableValue,
    },
    /// An element exceeded a configured reader limit.
    #[error("Limit exceeded at object index {index}: {reason}")]
    LimitExceeded {
        /// 0-based index of the element being decoded
        index: usize,
        /// Which limit was hit
        reason: String,
    },
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RedactError {
    /// Process exit status that reports this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RedactError::Config(_) => EXIT_CONFIG,
            RedactError::NotFound { .. } => EXIT_NOT_FOUND,
            RedactError::MalformedInput { .. }
            | RedactError::TypeMismatch { .. }
            | RedactError::LimitExceeded { .. }
            | RedactError::Json(_) => EXIT_MALFORMED,
            RedactError::Io(_) => EXIT_CONFIG,
        }
    }

    /// Element index carried by streaming errors.
    pub fn element_index(&self) -> Option<usize> {
        match self {
            RedactError::MalformedInput { index, .. }
            | RedactError::TypeMismatch { index, .. }
            | RedactError::LimitExceeded { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RedactError>;
