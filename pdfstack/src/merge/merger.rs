//! The merge engine.
//!
//! Inputs are processed strictly one after another, in selection order. Each
//! one is decoded on the blocking pool and awaited before the next starts, so
//! pages land in the output in exactly the order they were selected.

use chrono::Utc;
use lopdf::Document;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

use crate::config::{Config, FailurePolicy, Metadata};
use crate::error::{PdfStackError, Result};
use crate::merge::document::{DocumentBuilder, OutputDocument};
use crate::merge::image::{self, DecodedImage};
use crate::output::format_file_size;
use crate::selection::SelectionSnapshot;
use crate::validation::{InputKind, PendingInput};

/// Statistics about a merge operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeStatistics {
    /// Number of inputs that contributed pages (or an empty page range).
    pub files_merged: usize,

    /// Number of inputs left out under [`FailurePolicy::Skip`].
    pub files_skipped: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total size of the selected inputs in bytes.
    pub input_size: u64,

    /// Time spent decoding and assembling.
    #[serde(rename = "merge_time_ms", serialize_with = "serialize_millis")]
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

fn serialize_millis<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis().try_into().unwrap_or(u64::MAX))
}

/// An input left out of the output because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInput {
    /// Display name of the input.
    pub name: String,
    /// Decoder message.
    pub reason: String,
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeResult {
    /// The assembled document.
    pub document: OutputDocument,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Inputs that were left out, in selection order.
    pub skipped: Vec<SkippedInput>,
}

/// One line of a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedInput {
    /// Display name of the input.
    pub name: String,
    /// Classified kind of the input.
    pub kind: InputKind,
    /// Pages the input would contribute; zero if it failed to decode.
    pub pages: usize,
    /// Decoder message if the input could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a merge of a snapshot would produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergePlan {
    /// Per-input results, in selection order.
    pub inputs: Vec<PlannedInput>,
    /// Pages the readable inputs would contribute in total.
    pub total_pages: usize,
    /// Total size of the selected inputs in bytes.
    pub input_size: u64,
}

impl MergePlan {
    /// Number of inputs that failed to decode.
    pub fn failed(&self) -> usize {
        self.inputs.iter().filter(|i| i.error.is_some()).count()
    }

    /// Whether merging would succeed under `policy`.
    pub fn would_succeed(&self, policy: FailurePolicy) -> bool {
        let failed = self.failed();
        match policy {
            FailurePolicy::Abort => failed == 0,
            FailurePolicy::Skip => failed < self.inputs.len(),
        }
    }
}

/// A selected input after decoding.
enum DecodedSource {
    Pdf(Document),
    Image(DecodedImage),
}

impl DecodedSource {
    fn page_count(&self) -> usize {
        match self {
            Self::Pdf(doc) => doc.get_pages().len(),
            Self::Image(_) => 1,
        }
    }
}

/// Combines the inputs of a selection snapshot into one document.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    failure_policy: FailurePolicy,
    metadata: Metadata,
}

impl MergeEngine {
    /// Create an engine with the default (abort) failure policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine using the policy and metadata from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            failure_policy: config.failure_policy,
            metadata: config.metadata.clone(),
        }
    }

    /// Set the behavior for inputs that fail to decode.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the document information written into the output.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The configured failure policy.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Merge every input of `snapshot`, in order, into one document.
    ///
    /// PDF inputs contribute all their pages unchanged. Image inputs each
    /// contribute one page exactly the size of the image.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The snapshot is empty ([`PdfStackError::EmptySelection`])
    /// - An input cannot be decoded and the policy is abort
    /// - Every input fails under the skip policy (the first failure is returned)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstack::merge::MergeEngine;
    /// # use pdfstack::selection::SelectionStore;
    /// # async fn example(store: SelectionStore) -> pdfstack::Result<()> {
    /// let engine = MergeEngine::new();
    /// let mut result = engine.merge(&store.snapshot()).await?;
    /// println!("Merged {} files into {} pages",
    ///          result.statistics.files_merged,
    ///          result.statistics.total_pages);
    /// let bytes = result.document.to_bytes()?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(inputs = snapshot.len(), policy = ?self.failure_policy))]
    pub async fn merge(&self, snapshot: &SelectionSnapshot) -> Result<MergeResult> {
        if snapshot.is_empty() {
            return Err(PdfStackError::EmptySelection);
        }

        let start = Instant::now();
        let mut builder = DocumentBuilder::new();
        let mut skipped = Vec::new();
        let mut first_failure = None;
        let mut files_merged = 0;

        for input in snapshot.shared() {
            let outcome = match decode(Arc::clone(input)).await {
                Ok(source) => append(&mut builder, input, source),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(()) => files_merged += 1,
                Err(err) if self.failure_policy == FailurePolicy::Skip => {
                    tracing::warn!(name = input.name(), error = %err, "skipping input");
                    skipped.push(SkippedInput {
                        name: input.name().to_string(),
                        reason: failure_reason(&err),
                    });
                    first_failure.get_or_insert(err);
                }
                Err(err) => {
                    tracing::debug!(name = input.name(), "aborting merge");
                    return Err(err);
                }
            }
        }

        if files_merged == 0
            && let Some(err) = first_failure
        {
            return Err(err);
        }

        let document = builder.finish(&self.metadata, Utc::now());
        let statistics = MergeStatistics {
            files_merged,
            files_skipped: skipped.len(),
            total_pages: document.page_count(),
            input_size: snapshot.total_size(),
            merge_time: start.elapsed(),
        };

        tracing::info!(
            files = statistics.files_merged,
            skipped = statistics.files_skipped,
            pages = statistics.total_pages,
            elapsed_ms = statistics.merge_time.as_millis() as u64,
            "merge complete"
        );

        Ok(MergeResult {
            document,
            statistics,
            skipped,
        })
    }

    /// Decode every input and report what a merge would produce.
    ///
    /// Failures are recorded per input instead of stopping the plan.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::EmptySelection`] if the snapshot is empty.
    pub async fn plan(&self, snapshot: &SelectionSnapshot) -> Result<MergePlan> {
        if snapshot.is_empty() {
            return Err(PdfStackError::EmptySelection);
        }

        let mut inputs = Vec::with_capacity(snapshot.len());
        for input in snapshot.shared() {
            let (pages, error) = match decode(Arc::clone(input)).await {
                Ok(source) => (source.page_count(), None),
                Err(err) => (0, Some(failure_reason(&err))),
            };
            inputs.push(PlannedInput {
                name: input.name().to_string(),
                kind: input.kind(),
                pages,
                error,
            });
        }

        Ok(MergePlan {
            total_pages: inputs.iter().map(|i| i.pages).sum(),
            input_size: snapshot.total_size(),
            inputs,
        })
    }
}

/// Decode one input on the blocking pool.
async fn decode(input: Arc<PendingInput>) -> Result<DecodedSource> {
    let name = input.name().to_string();

    tokio::task::spawn_blocking(move || decode_blocking(&input))
        .await
        .map_err(|e| PdfStackError::other(format!("Decoding '{name}' did not complete: {e}")))?
}

fn decode_blocking(input: &PendingInput) -> Result<DecodedSource> {
    let source = match input.kind() {
        InputKind::Pdf => Document::load_mem(input.bytes())
            .map(DecodedSource::Pdf)
            .map_err(|e| PdfStackError::source_decode_failure(input.name(), e.to_string()))?,
        InputKind::Image(format) => image::decode(input.bytes(), format)
            .map(DecodedSource::Image)
            .map_err(|reason| PdfStackError::source_decode_failure(input.name(), reason))?,
    };

    tracing::debug!(
        name = input.name(),
        kind = %input.kind(),
        pages = source.page_count(),
        "decoded input"
    );
    Ok(source)
}

/// Add a decoded input to the document being built.
///
/// Nothing is added if this fails.
fn append(
    builder: &mut DocumentBuilder,
    input: &PendingInput,
    source: DecodedSource,
) -> Result<()> {
    match source {
        DecodedSource::Pdf(doc) => {
            let pages = builder
                .append_pdf(input.name(), doc)
                .map_err(|e| PdfStackError::source_decode_failure(input.name(), e.to_string()))?;
            if pages == 0 {
                tracing::warn!(name = input.name(), "PDF has no pages");
            }
        }
        DecodedSource::Image(image) => builder.append_image(input.name(), input.kind(), image)?,
    }
    Ok(())
}

fn failure_reason(err: &PdfStackError) -> String {
    match err {
        PdfStackError::SourceDecodeFailure { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
