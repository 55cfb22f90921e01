//! Combining selected inputs into one PDF.
//!
//! The engine walks a [`SelectionSnapshot`](crate::selection::SelectionSnapshot)
//! in order. PDF pages are copied verbatim; each image becomes one page of
//! its own pixel size. The result is an [`OutputDocument`] that records which
//! pages each input contributed and serializes to a single PDF byte stream.

mod document;
pub mod image;
pub mod merger;
pub mod metadata;
pub mod pages;

pub use document::{OutputDocument, PageGroup};
pub use merger::{
    MergeEngine, MergePlan, MergeResult, MergeStatistics, PlannedInput, SkippedInput,
};
pub use metadata::MetadataManager;
pub use pages::PageInfo;
