//! Writing merged documents to disk.
//!
//! Writes go to a temporary file next to the target and are renamed into
//! place once complete, so a crash or full disk never leaves a truncated PDF
//! under the final name.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::io::writer::OutputWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> pdfstack::Result<()> {
//! let writer = OutputWriter::new();
//! let stats = writer.write(bytes, Path::new("dot.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfStackError, Result};
use crate::output::format_file_size;

/// Options for writing output files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone, Serialize)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    #[serde(skip)]
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes serialized documents to disk.
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    options: WriteOptions,
}

impl OutputWriter {
    /// Create a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Write `bytes` to `path`, replacing any existing file.
    ///
    /// Overwrite policy is the caller's business; check [`exists`](Self::exists)
    /// first if it matters.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file (or its temporary sibling) cannot be created
    /// - Writing or renaming fails
    pub async fn write(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || write_blocking(&bytes, path_buf, &options))
            .await
            .map_err(|e| PdfStackError::other(format!("Write task failed: {e}")))?
    }

    /// Check that the output directory of `path` exists and is writable.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InvalidConfig`] if the directory is missing
    /// or read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
            PdfStackError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(PdfStackError::invalid_config(format!(
                "Output directory is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(PdfStackError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if an output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn write_blocking(bytes: &[u8], path: PathBuf, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    let write_path = if options.atomic {
        temp_path(&path)
    } else {
        path.clone()
    };

    let file = std::fs::File::create(&write_path).map_err(|e| PdfStackError::FailedToCreateOutput {
        path: write_path.clone(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
    let written = writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .and_then(|()| writer.get_ref().sync_all());

    if let Err(e) = written {
        if options.atomic {
            let _ = std::fs::remove_file(&write_path);
        }
        return Err(PdfStackError::FailedToWrite {
            path: write_path,
            source: e,
        });
    }
    drop(writer);

    if options.atomic {
        std::fs::rename(&write_path, &path).map_err(|e| {
            let _ = std::fs::remove_file(&write_path);
            PdfStackError::FailedToWrite {
                path: path.clone(),
                source: e,
            }
        })?;
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote output file");

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size: bytes.len() as u64,
        output_path: path,
    })
}

/// Hidden sibling used while an atomic write is in progress.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
