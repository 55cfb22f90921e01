//! CLI argument parsing for pdfstack.
//!
//! This module defines the command-line interface using `clap`. It is also
//! compiled by `build.rs` to render the man page, so it must only depend on
//! `clap` and the `pdfstack` library.

use clap::Parser;
use std::path::PathBuf;

use pdfstack::config::{
    Config, DEFAULT_BASE_NAME, DEFAULT_EXTENSION, FailurePolicy, Metadata, OverwriteMode,
};
use pdfstack::error::{PdfStackError, Result};

/// Stack PDF documents and images into a single PDF.
///
/// Every page of every PDF is copied as-is; each JPEG or PNG becomes one
/// page of exactly its pixel size. Inputs are merged in the order given.
#[derive(Parser, Debug)]
#[command(name = "pdfstack")]
#[command(version)]
#[command(about = "Stack PDF documents and JPEG/PNG images into a single PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input files or glob patterns (PDF, JPEG, PNG), in merge order
    ///
    /// Examples:
    ///   pdfstack cover.pdf scans/*.jpg appendix.pdf
    ///   pdfstack "photos/*.png" --name album
    #[arg(value_name = "FILE", required_unless_present_any = ["interactive", "input_list"])]
    pub inputs: Vec<String>,

    /// Read additional input paths from a file (one per line, '-' for stdin)
    ///
    /// Paths from the list are appended after the direct inputs.
    #[arg(long, value_name = "FILE", conflicts_with = "interactive")]
    pub input_list: Option<PathBuf>,

    /// Directory the merged PDF is written to
    #[arg(
        short,
        long,
        value_name = "DIR",
        default_value = ".",
        env = "PDFSTACK_OUTPUT_DIR"
    )]
    pub output_dir: PathBuf,

    /// Base name of the output file
    ///
    /// The first merge is written as NAME.pdf, later merges in the same
    /// interactive session as NAME(1).pdf, NAME(2).pdf, ...
    #[arg(long, value_name = "NAME", default_value = DEFAULT_BASE_NAME)]
    pub name: String,

    /// Leave out the input at position N (1-based, repeatable)
    ///
    /// Positions refer to the list as given; several exclusions are applied
    /// from the highest position down so they do not shift each other.
    #[arg(short = 'x', long = "exclude", value_name = "N")]
    pub exclude: Vec<usize>,

    /// Skip inputs that cannot be decoded instead of aborting
    #[arg(long)]
    pub skip_failed: bool,

    /// Decode every input and report the result without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - list the selection and show merge statistics
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Set title metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for the output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Print a JSON summary to stdout instead of text
    #[arg(long)]
    pub json: bool,

    /// Log level for diagnostics on stderr (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    #[arg(value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: Option<String>,

    /// Start an interactive shell (add, rm, ls, merge, ...)
    #[arg(short, long)]
    pub interactive: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn to_config(&self) -> Result<Config> {
        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let failure_policy = if self.skip_failed {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            base_name: self.name.clone(),
            extension: DEFAULT_EXTENSION.to_string(),
            output_dir: self.output_dir.clone(),
            failure_policy,
            overwrite_mode,
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            metadata,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate CLI arguments before any file is read.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclusion position is zero, or exclusions are
    /// combined with the interactive shell.
    pub fn validate(&self) -> Result<()> {
        if self.exclude.contains(&0) {
            return Err(PdfStackError::invalid_config(
                "Exclusion positions start at 1",
            ));
        }

        if self.interactive && !self.exclude.is_empty() {
            return Err(PdfStackError::invalid_config(
                "--exclude cannot be used with --interactive; use 'rm' instead",
            ));
        }

        Ok(())
    }

    /// Exclusion positions as zero-based indices, highest first, deduplicated.
    pub fn exclusions(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .exclude
            .iter()
            .filter(|&&n| n > 0)
            .map(|n| n - 1)
            .collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        indices
    }
}
