//! Output formatting and display for pdfstack.
//!
//! This module handles all user-facing output: status messages, selection
//! listings, merge summaries and dry-run plans. Diagnostics for developers go
//! through `tracing` instead.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::output::OutputFormatter;
//! use pdfstack::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::merge::{MergePlan, MergeStatistics, SkippedInput};
use crate::selection::SelectionEntry;

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// One line describing a selected file, e.g. `scan.png (PNG, 12.00 KB)`.
pub fn describe_entry(entry: &SelectionEntry) -> String {
    format!(
        "{} ({}, {})",
        entry.name,
        entry.kind,
        format_file_size(entry.size as u64)
    )
}

/// Display the selection as a numbered list (1-based, merge order).
pub fn display_selection(formatter: &OutputFormatter, entries: &[SelectionEntry]) {
    if entries.is_empty() {
        formatter.info("No files selected");
        return;
    }

    for entry in entries {
        formatter.list_item(entry.position + 1, &describe_entry(entry));
    }
}

/// Display the outcome of a merge.
pub fn display_merge_statistics(
    formatter: &OutputFormatter,
    file_name: &str,
    stats: &MergeStatistics,
    skipped: &[SkippedInput],
) {
    for input in skipped {
        formatter.warning(&format!("Skipped '{}': {}", input.name, input.reason));
    }

    formatter.success(&format!(
        "Merged {} file(s) into {} ({} pages)",
        stats.files_merged, file_name, stats.total_pages
    ));
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail(
        "Merge time",
        &format!("{:.2}s", stats.merge_time.as_secs_f64()),
    );
}

/// Display a dry-run plan.
pub fn display_plan(formatter: &OutputFormatter, plan: &MergePlan, file_name: &str) {
    formatter.section("Dry run: nothing will be written");

    for (position, input) in plan.inputs.iter().enumerate() {
        let line = match &input.error {
            Some(reason) => format!("{} ({}): unreadable: {reason}", input.name, input.kind),
            None => format!("{} ({}): {} page(s)", input.name, input.kind, input.pages),
        };
        formatter.list_item(position + 1, &line);
    }

    formatter.info(&format!(
        "Would write {} with {} pages from {} file(s), {}",
        file_name,
        plan.total_pages,
        plan.inputs.len() - plan.failed(),
        format_file_size(plan.input_size)
    ));
    if plan.failed() > 0 {
        formatter.warning(&format!("{} file(s) could not be read", plan.failed()));
    }
}
