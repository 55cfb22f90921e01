//! Error types for pdfstack.
//!
//! Every failure is local and recoverable from the caller's point of view:
//! none of them leaves the selection or the session counter in a modified
//! state, and no partially assembled output is ever handed out.
//!
//! # Error Categories
//!
//! - **Selection Errors**: unsupported inputs, bad removal indices
//! - **Merge Errors**: empty selection, undecodable sources, overlapping merges
//! - **I/O Errors**: reading inputs and writing the merged document

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstack operations.
pub type Result<T> = std::result::Result<T, PdfStackError>;

/// Main error type for pdfstack operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfStackError {
    /// One or more files carried a media type that cannot be merged.
    #[error("These file types are not supported:\n  {}", names.join("\n  "))]
    UnsupportedType {
        /// Names of the rejected files, in input order.
        names: Vec<String>,
    },

    /// A merge was requested with nothing selected.
    #[error("No files selected: add PDF, JPG, or PNG files first")]
    EmptySelection,

    /// A removal index was outside the current selection.
    #[error("No selected file at position {index} (selection has {len} file(s))")]
    IndexOutOfRange {
        /// Requested zero-based index.
        index: usize,
        /// Length of the selection at the time of the request.
        len: usize,
    },

    /// A selected file could not be parsed or decoded.
    #[error("Could not read '{name}'\n  Reason: {reason}")]
    SourceDecodeFailure {
        /// Display name of the offending input.
        name: String,
        /// Decoder message.
        reason: String,
    },

    /// Another merge is still running in this session.
    #[error("A merge is already in progress")]
    MergeInProgress,

    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input file exists but could not be read.
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input path is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different name",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The assembled document could not be serialized.
    #[error("Failed to serialize merged document: {reason}")]
    FailedToSerialize {
        /// Serializer message.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfStackError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfStackError {
    /// Create an UnsupportedType error.
    pub fn unsupported_type(names: Vec<String>) -> Self {
        Self::UnsupportedType { names }
    }

    /// Create an IndexOutOfRange error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a SourceDecodeFailure error.
    pub fn source_decode_failure(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceDecodeFailure {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a FailedToSerialize error.
    pub fn failed_to_serialize(reason: impl Into<String>) -> Self {
        Self::FailedToSerialize {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if the user can fix this by editing the selection and retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType { .. }
                | Self::EmptySelection
                | Self::IndexOutOfRange { .. }
                | Self::SourceDecodeFailure { .. }
                | Self::MergeInProgress
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedType { .. } => 1,
            Self::EmptySelection => 1,
            Self::IndexOutOfRange { .. } => 1,
            Self::SourceDecodeFailure { .. } => 3,
            Self::MergeInProgress => 6,
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::FailedToSerialize { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // SIGINT convention
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
