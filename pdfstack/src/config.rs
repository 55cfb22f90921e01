//! Configuration for a pdfstack session.
//!
//! The CLI turns its arguments into a [`Config`]; library users build one
//! directly or start from [`Config::default`]. Validation happens once, when
//! a [`Session`](crate::session::Session) is created.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PdfStackError, Result};

/// Base name used for merged output when none is given.
pub const DEFAULT_BASE_NAME: &str = "dot";

/// Extension of every merged output file.
pub const DEFAULT_EXTENSION: &str = "pdf";

/// What the merge engine does when one selected file cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Discard everything merged so far and report the failure.
    #[default]
    Abort,
    /// Leave the failed file out, merge the rest, and report what was skipped.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = PdfStackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            _ => Err(PdfStackError::invalid_config(format!(
                "Invalid failure policy: {s}. Must be one of: abort, skip"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Document information written into the merged PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Create metadata from optional strings, trimming whitespace.
    ///
    /// Blank values are dropped.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let clean = |opt: Option<String>| {
            opt.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            title: clean(title),
            author: clean(author),
            subject: clean(subject),
            keywords: clean(keywords),
        }
    }

    /// Check if any user-supplied field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }
}

/// Complete configuration for a merge session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base of the output file name (`dot` gives `dot.pdf`, `dot(1).pdf`, ...).
    pub base_name: String,

    /// Extension of the output file name, without the dot.
    pub extension: String,

    /// Directory merged files are written to.
    pub output_dir: PathBuf,

    /// Behavior when a selected file fails to decode.
    pub failure_policy: FailurePolicy,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Dry run mode: decode and plan without producing output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode: suppress non-error output.
    pub quiet: bool,

    /// Metadata to set on the output document.
    pub metadata: Metadata,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_name: DEFAULT_BASE_NAME.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            output_dir: PathBuf::from("."),
            failure_policy: FailurePolicy::default(),
            overwrite_mode: OverwriteMode::default(),
            dry_run: false,
            verbose: false,
            quiet: false,
            metadata: Metadata::default(),
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base name or extension is empty or contains a path separator
    /// - Verbose and quiet modes are both enabled
    pub fn validate(&self) -> Result<()> {
        if self.base_name.trim().is_empty() {
            return Err(PdfStackError::invalid_config("Output name cannot be empty"));
        }

        if self.base_name.contains(['/', '\\']) {
            return Err(PdfStackError::invalid_config(format!(
                "Output name must not contain a path separator: {}",
                self.base_name
            )));
        }

        if self.extension.is_empty() || self.extension.contains(['/', '\\', '.']) {
            return Err(PdfStackError::invalid_config(format!(
                "Invalid output extension: '{}'",
                self.extension
            )));
        }

        if self.verbose && self.quiet {
            return Err(PdfStackError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        Ok(())
    }
}
