//! Error kinds surfaced by the library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while resolving or extracting aligned subsequences.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Open, read, seek or write failure on an underlying resource.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested ungapped offset lies past the end of the reference.
    #[error("ungapped offset {target} out of range (reference has {available} non-gap characters)")]
    OutOfRange {
        /// Ungapped offset that was requested.
        target: u64,
        /// Number of non-gap characters actually present.
        available: u64,
    },

    /// Malformed region record.
    #[error("invalid region record at line {line}: {msg}")]
    Format {
        /// 1-based line number of the offending record.
        line: usize,
        /// Description of the problem.
        msg: String,
    },

    /// Invalid arguments detected before any I/O took place.
    #[error("invalid usage: {0}")]
    Usage(String),

    /// Output artifact exists already; it is never overwritten.
    #[error("output file {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// A source does not share the reference's column count.
    #[error("{} has {actual} aligned columns, reference has {expected}", .path.display())]
    AlignmentMismatch {
        /// Offending source file.
        path: PathBuf,
        /// Length of the reference's aligned stream.
        expected: u64,
        /// Length of the source's aligned stream.
        actual: u64,
    },
}

impl ExtractError {
    /// Helper for constructing usage errors.
    pub fn usage(msg: impl Into<String>) -> Self {
        ExtractError::Usage(msg.into())
    }

    /// Helper for constructing region format errors.
    pub fn format(line: usize, msg: impl Into<String>) -> Self {
        ExtractError::Format {
            line,
            msg: msg.into(),
        }
    }
}
