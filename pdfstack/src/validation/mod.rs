//! Input classification.
//!
//! Every file handed to pdfstack passes through [`InputValidator::classify`]
//! exactly once. It looks at the declared media type, nothing else, and turns
//! the file into a [`PendingInput`] tagged with an [`InputKind`]. From then on
//! the rest of the crate matches on the kind instead of comparing strings, so
//! this is the only place a new input kind has to be added.
//!
//! # Examples
//!
//! ```
//! use pdfstack::validation::{FileDescriptor, InputValidator};
//!
//! let batch = vec![
//!     FileDescriptor::new("report.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
//!     FileDescriptor::new("notes.txt", "text/plain", b"hello".to_vec()),
//! ];
//!
//! let classification = InputValidator::new().classify(batch);
//! assert_eq!(classification.accepted.len(), 1);
//! assert_eq!(classification.rejected, vec!["notes.txt".to_string()]);
//! ```

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::PdfStackError;

/// Media type of PDF documents.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Media type of JPEG images.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Media type of PNG images.
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Media type assigned to files whose extension is not recognized.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A raw file as received from the surrounding application.
#[derive(Clone)]
pub struct FileDescriptor {
    /// Display name (usually the file name).
    pub name: String,
    /// Declared media type, e.g. `application/pdf`.
    pub media_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FileDescriptor {
    /// Create a descriptor from its parts.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raster formats accepted as single-page inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
}

/// Kind of an accepted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A paginated PDF document; contributes all of its pages.
    Pdf,
    /// A raster image; contributes exactly one page.
    Image(ImageFormat),
}

impl InputKind {
    /// Classify a declared media type.
    ///
    /// Only the essence of the type counts: parameters such as
    /// `; charset=binary` and ASCII case are ignored.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MEDIA_TYPE => Some(Self::Pdf),
            JPEG_MEDIA_TYPE => Some(Self::Image(ImageFormat::Jpeg)),
            PNG_MEDIA_TYPE => Some(Self::Image(ImageFormat::Png)),
            _ => None,
        }
    }

    /// Canonical media type of this kind.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MEDIA_TYPE,
            Self::Image(ImageFormat::Jpeg) => JPEG_MEDIA_TYPE,
            Self::Image(ImageFormat::Png) => PNG_MEDIA_TYPE,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Image(ImageFormat::Jpeg) => write!(f, "JPEG"),
            Self::Image(ImageFormat::Png) => write!(f, "PNG"),
        }
    }
}

/// Guess the declared media type of a file from its extension.
///
/// Unknown extensions get [`UNKNOWN_MEDIA_TYPE`], which the validator rejects.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("jpg") | Some("jpeg") => JPEG_MEDIA_TYPE,
        Some("png") => PNG_MEDIA_TYPE,
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// A validated file waiting to be merged.
///
/// Only [`InputValidator`] creates these, so anything in a selection has
/// passed classification. The contents are shared and never mutated.
#[derive(Clone)]
pub struct PendingInput {
    name: String,
    kind: InputKind,
    bytes: Arc<[u8]>,
}

impl PendingInput {
    /// Display name of the input.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classified kind of the input.
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Raw contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the contents in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the contents are empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for PendingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingInput")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Outcome of classifying one batch.
#[derive(Debug, Default)]
pub struct Classification {
    /// Accepted inputs, in batch order.
    pub accepted: Vec<PendingInput>,
    /// Names of rejected files, in batch order.
    pub rejected: Vec<String>,
}

impl Classification {
    /// The error to report for the rejected files, if there were any.
    pub fn rejection(&self) -> Option<PdfStackError> {
        if self.rejected.is_empty() {
            None
        } else {
            Some(PdfStackError::unsupported_type(self.rejected.clone()))
        }
    }
}

/// Stateless classifier for incoming files.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator;

impl InputValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Partition a batch into accepted inputs and rejected names.
    ///
    /// A batch with nothing accepted is a normal result; the caller decides
    /// what to report.
    pub fn classify(&self, batch: Vec<FileDescriptor>) -> Classification {
        let mut classification = Classification::default();

        for file in batch {
            match InputKind::from_media_type(&file.media_type) {
                Some(kind) => classification.accepted.push(PendingInput {
                    name: file.name,
                    kind,
                    bytes: Arc::from(file.bytes),
                }),
                None => {
                    tracing::debug!(
                        name = %file.name,
                        media_type = %file.media_type,
                        "rejected unsupported input"
                    );
                    classification.rejected.push(file.name);
                }
            }
        }

        classification
    }
}
