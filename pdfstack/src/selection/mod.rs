//! The ordered set of files waiting to be merged.
//!
//! [`SelectionStore`] is an explicit, owned object: whoever needs it gets a
//! reference, nothing reaches it through global state. Every mutation returns
//! a [`SelectionChange`] describing what happened, and rendering (if any) is
//! left to the caller.
//!
//! A merge never works on the live store. It takes a [`SelectionSnapshot`],
//! a frozen copy that later appends and removals cannot touch.

use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;

use crate::error::{PdfStackError, Result};
use crate::validation::{InputKind, PendingInput};

/// Description of a single mutation of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Inputs were added at the end; `range` holds their new positions.
    Appended {
        /// Positions occupied by the appended inputs.
        range: Range<usize>,
    },
    /// The input at `index` was removed; everything after it moved down by one.
    Removed {
        /// Position the input occupied before removal.
        index: usize,
        /// Name of the removed input.
        name: String,
    },
}

/// One row of a selection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEntry {
    /// Zero-based position (merge order).
    pub position: usize,
    /// Display name.
    pub name: String,
    /// Classified kind.
    pub kind: InputKind,
    /// Size of the file in bytes.
    pub size: usize,
}

/// Ordered, mutable collection of pending inputs.
#[derive(Debug, Default)]
pub struct SelectionStore {
    inputs: Vec<Arc<PendingInput>>,
}

impl SelectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch at the end, keeping its relative order.
    ///
    /// Returns `None` when the batch is empty, since nothing changed.
    pub fn append(&mut self, inputs: Vec<PendingInput>) -> Option<SelectionChange> {
        if inputs.is_empty() {
            return None;
        }

        let start = self.inputs.len();
        self.inputs.extend(inputs.into_iter().map(Arc::new));
        let range = start..self.inputs.len();

        tracing::debug!(?range, total = self.inputs.len(), "appended inputs");
        Some(SelectionChange::Appended { range })
    }

    /// Remove the input currently at `index`.
    ///
    /// The index is resolved against the contents as they are now, so a
    /// sequence of removals each sees the result of the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::IndexOutOfRange`] and leaves the store
    /// untouched if `index` is not a current position.
    pub fn remove_at(&mut self, index: usize) -> Result<SelectionChange> {
        if index >= self.inputs.len() {
            return Err(PdfStackError::index_out_of_range(index, self.inputs.len()));
        }

        let removed = self.inputs.remove(index);
        tracing::debug!(index, name = removed.name(), "removed input");

        Ok(SelectionChange::Removed {
            index,
            name: removed.name().to_string(),
        })
    }

    /// Remove everything, returning how many inputs were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.inputs.len();
        self.inputs.clear();
        count
    }

    /// Number of pending inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Input at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&PendingInput> {
        self.inputs.get(index).map(Arc::as_ref)
    }

    /// Listing of the current contents in merge order.
    pub fn entries(&self) -> Vec<SelectionEntry> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(position, input)| SelectionEntry {
                position,
                name: input.name().to_string(),
                kind: input.kind(),
                size: input.len(),
            })
            .collect()
    }

    /// Freeze the current contents for a merge.
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            inputs: self.inputs.iter().cloned().collect(),
        }
    }
}

/// Immutable ordered copy of a selection.
///
/// Cloning is cheap: inputs are shared, not copied.
#[derive(Debug, Clone, Default)]
pub struct SelectionSnapshot {
    inputs: Arc<[Arc<PendingInput>]>,
}

impl SelectionSnapshot {
    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Iterate over the inputs in merge order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingInput> {
        self.inputs.iter().map(Arc::as_ref)
    }

    pub(crate) fn shared(&self) -> impl Iterator<Item = &Arc<PendingInput>> {
        self.inputs.iter()
    }

    /// Total size of all inputs in bytes.
    pub fn total_size(&self) -> u64 {
        self.iter().map(|input| input.len() as u64).sum()
    }
}

impl From<Vec<PendingInput>> for SelectionSnapshot {
    fn from(inputs: Vec<PendingInput>) -> Self {
        Self {
            inputs: inputs.into_iter().map(Arc::new).collect(),
        }
    }
}
