//! The boundary the surrounding application talks to.
//!
//! A [`Session`] owns one selection, one merge engine and one output namer.
//! It can be shared between tasks: the selection sits behind a mutex that is
//! only held for short synchronous sections, and a merge works from a
//! snapshot, so files added or removed while a merge runs do not affect it.
//! Only one merge may run at a time.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::config::Config;
//! use pdfstack::session::Session;
//! use pdfstack::validation::FileDescriptor;
//!
//! # async fn example(pdf: Vec<u8>) -> pdfstack::Result<()> {
//! let session = Session::new(Config::default())?;
//! session.add_files(vec![FileDescriptor::new("a.pdf", "application/pdf", pdf)]);
//!
//! let merged = session.merge().await?;
//! assert_eq!(merged.file_name, "dot.pdf");
//! # Ok(())
//! # }
//! ```

pub mod namer;

pub use namer::SessionNamer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::Config;
use crate::error::{PdfStackError, Result};
use crate::merge::{MergeEngine, MergePlan, MergeStatistics, OutputDocument, SkippedInput};
use crate::selection::{SelectionChange, SelectionEntry, SelectionSnapshot, SelectionStore};
use crate::validation::{FileDescriptor, InputValidator};

/// What happened when a batch of files was offered to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The store mutation, if anything was accepted.
    pub change: Option<SelectionChange>,
    /// Names of files whose type is not supported, in batch order.
    pub rejected: Vec<String>,
}

impl AddOutcome {
    /// The error to show for rejected files, if there were any.
    pub fn rejection(&self) -> Option<PdfStackError> {
        if self.rejected.is_empty() {
            None
        } else {
            Some(PdfStackError::unsupported_type(self.rejected.clone()))
        }
    }
}

/// A finished merge, ready to be written out.
#[derive(Debug, Clone)]
pub struct MergedDocument {
    /// Name assigned by the session namer.
    pub file_name: String,
    /// The serialized PDF.
    pub bytes: Vec<u8>,
    /// Statistics about the merge.
    pub statistics: MergeStatistics,
    /// Inputs left out under the skip policy.
    pub skipped: Vec<SkippedInput>,
}

/// One selection, one engine, one naming sequence.
#[derive(Debug)]
pub struct Session {
    config: Config,
    validator: InputValidator,
    store: Mutex<SelectionStore>,
    namer: Mutex<SessionNamer>,
    engine: MergeEngine,
    busy: AtomicBool,
}

impl Session {
    /// Create a session from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            validator: InputValidator::new(),
            store: Mutex::new(SelectionStore::new()),
            namer: Mutex::new(SessionNamer::new(&config.base_name, &config.extension)),
            engine: MergeEngine::from_config(&config),
            busy: AtomicBool::new(false),
            config,
        })
    }

    /// The configuration this session was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Classify a batch and append the accepted files to the selection.
    pub fn add_files(&self, batch: Vec<FileDescriptor>) -> AddOutcome {
        let classification = self.validator.classify(batch);
        let change = self.store().append(classification.accepted);

        AddOutcome {
            change,
            rejected: classification.rejected,
        }
    }

    /// Remove the file currently at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::IndexOutOfRange`] if there is no such position.
    pub fn remove(&self, index: usize) -> Result<SelectionChange> {
        self.store().remove_at(index)
    }

    /// Remove every selected file, returning how many there were.
    pub fn clear(&self) -> usize {
        self.store().clear()
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.store().len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    /// Listing of the selection in merge order.
    pub fn entries(&self) -> Vec<SelectionEntry> {
        self.store().entries()
    }

    /// Freeze the current selection.
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.store().snapshot()
    }

    /// Number of merges that have succeeded in this session.
    pub fn merges_completed(&self) -> u64 {
        self.namer().completed()
    }

    /// File name the next successful merge will get.
    pub fn next_file_name(&self) -> String {
        self.namer().peek()
    }

    /// Whether a merge is running right now.
    pub fn is_merging(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Merge the current selection into one PDF.
    ///
    /// The selection is left as it was whether the merge succeeds or not. A
    /// file name is only used up when a document is actually produced.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another merge is still running ([`PdfStackError::MergeInProgress`])
    /// - Nothing is selected ([`PdfStackError::EmptySelection`])
    /// - A selected file cannot be decoded
    /// - The merged document cannot be serialized
    pub async fn merge(&self) -> Result<MergedDocument> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let snapshot = self.snapshot();

        let result = self.engine.merge(&snapshot).await?;
        let bytes = serialize(result.document).await?;
        let file_name = self.namer().commit();

        tracing::info!(file_name = %file_name, bytes = bytes.len(), "merged document ready");

        Ok(MergedDocument {
            file_name,
            bytes,
            statistics: result.statistics,
            skipped: result.skipped,
        })
    }

    /// Report what merging the current selection would produce.
    ///
    /// No name is used up and nothing is serialized.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::EmptySelection`] if nothing is selected.
    pub async fn plan(&self) -> Result<MergePlan> {
        let snapshot = self.snapshot();
        self.engine.plan(&snapshot).await
    }

    fn store(&self) -> MutexGuard<'_, SelectionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn namer(&self) -> MutexGuard<'_, SessionNamer> {
        self.namer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn serialize(mut document: OutputDocument) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || document.to_bytes())
        .await
        .map_err(|e| PdfStackError::failed_to_serialize(e.to_string()))?
}

/// Holds the session's busy flag for the duration of a merge.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PdfStackError::MergeInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
