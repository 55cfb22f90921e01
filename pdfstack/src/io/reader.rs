//! Reading input files from disk.
//!
//! Turns paths (or glob patterns) into [`FileDescriptor`]s: the file name,
//! a media type guessed from the extension, and the raw contents. Nothing is
//! parsed here; classification and decoding happen later.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::io::reader::FileReader;
//!
//! # async fn example() -> pdfstack::Result<()> {
//! let reader = FileReader::new();
//! let paths = reader.expand_patterns(["scans/*.png", "cover.pdf"])?;
//! let batch = reader.read_all(&paths).await?;
//! # Ok(())
//! # }
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PdfStackError, Result};
use crate::validation::{FileDescriptor, media_type_for_path};

/// Reads input files into descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReader;

impl FileReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Read one file.
    ///
    /// The descriptor's name is the final path component, and its media type
    /// comes from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path is not a regular file
    /// - The file cannot be read
    pub async fn read(&self, path: &Path) -> Result<FileDescriptor> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| access_error(path, e))?;
        if !metadata.is_file() {
            return Err(PdfStackError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| access_error(path, e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(path = %path.display(), len = bytes.len(), "read input file");
        Ok(FileDescriptor::new(name, media_type_for_path(path), bytes))
    }

    /// Read several files, in order, stopping at the first failure.
    pub async fn read_all(&self, paths: &[PathBuf]) -> Result<Vec<FileDescriptor>> {
        let mut batch = Vec::with_capacity(paths.len());
        for path in paths {
            batch.push(self.read(path).await?);
        }
        Ok(batch)
    }

    /// Expand glob patterns into paths, keeping the order patterns were given.
    ///
    /// A pattern with no glob metacharacters is passed through unchanged so
    /// that a missing file is reported as such when it is read. Matches of a
    /// single pattern come back in the sorted order `glob` produces.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InvalidConfig`] for a malformed pattern, or
    /// an access error if a directory cannot be listed.
    pub fn expand_patterns<I>(&self, patterns: I) -> Result<Vec<PathBuf>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut paths = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            if !is_glob(pattern) {
                paths.push(PathBuf::from(pattern));
                continue;
            }

            let matches = glob::glob(pattern).map_err(|e| {
                PdfStackError::invalid_config(format!("Invalid pattern '{pattern}': {e}"))
            })?;
            let before = paths.len();
            for entry in matches {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    PdfStackError::FileNotAccessible {
                        path,
                        source: e.into(),
                    }
                })?;
                if path.is_file() {
                    paths.push(path);
                }
            }

            if paths.len() == before {
                tracing::warn!(pattern, "pattern matched no files");
            }
        }

        Ok(paths)
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn access_error(path: &Path, err: std::io::Error) -> PdfStackError {
    match err.kind() {
        ErrorKind::NotFound => PdfStackError::file_not_found(path.to_path_buf()),
        _ => PdfStackError::FileNotAccessible {
            path: path.to_path_buf(),
            source: err,
        },
    }
}
