//! Error types for SAV subTemplateList decoding.
//!
//! Every decoding stage reports failure through [`SavError`]. A failed call
//! never leaves state behind, so callers can log the error, skip the record
//! and keep decoding the rest of the stream.

use std::io;
use thiserror::Error;

/// Result type alias for SAV decoding operations.
pub type Result<T> = std::result::Result<T, SavError>;

/// Errors that can occur while decoding SAV records.
#[derive(Debug, Error)]
pub enum SavError {
    /// Buffer is shorter than the structure being decoded requires.
    #[error("Insufficient data: need {needed} bytes, {available} available")]
    InsufficientData {
        /// Bytes required by the structure.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// Sub-template id outside the SAV range 901-904.
    #[error("Unsupported SAV sub-template id {0}")]
    UnsupportedTemplate(u16),

    /// Empty buffer or wrongly sized input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Content did not divide into whole records (strict policy only).
    #[error("{remainder} trailing bytes after last {record_size}-byte record")]
    TrailingBytes {
        /// Bytes left after the last whole record.
        remainder: usize,
        /// Record size of the resolved layout.
        record_size: usize,
    },

    /// Required field of the outer SAV record is absent.
    #[error("Missing SAV record field: {0}")]
    MissingField(&'static str),

    /// Scalar field of the outer SAV record has the wrong width.
    #[error("Invalid width for SAV record field {field}: {len} bytes")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Width received.
        len: usize,
    },

    /// Configuration could not be parsed or serialized.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while reading or writing configuration.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Fieldless classification of [`SavError`] for callers that only branch on
/// the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InsufficientData,
    UnsupportedTemplate,
    InvalidArgument,
    TrailingBytes,
    MalformedRecord,
    Config,
}

impl SavError {
    /// Creates an insufficient data error.
    pub fn insufficient(needed: usize, available: usize) -> Self {
        Self::InsufficientData { needed, available }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SavError::InsufficientData { .. } => ErrorKind::InsufficientData,
            SavError::UnsupportedTemplate(_) => ErrorKind::UnsupportedTemplate,
            SavError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SavError::TrailingBytes { .. } => ErrorKind::TrailingBytes,
            SavError::MissingField(_) | SavError::InvalidField { .. } => {
                ErrorKind::MalformedRecord
            }
            SavError::Config(_) | SavError::Io(_) => ErrorKind::Config,
        }
    }

    /// Returns true if the error was caused by malformed wire data, as
    /// opposed to local configuration problems.
    pub fn is_wire_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Config)
    }
}
