//! pdfstack - Stack PDF documents and images into a single PDF.
//!
//! One-shot mode merges the files given on the command line; `--interactive`
//! opens a shell that keeps one selection and naming sequence alive across
//! several merges.

mod cli;
mod shell;

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::shell::{Command, HELP, is_yes};
use pdfstack::config::{FailurePolicy, OverwriteMode};
use pdfstack::error::{PdfStackError, Result};
use pdfstack::io::{FileReader, OutputWriter};
use pdfstack::merge::{MergePlan, MergeStatistics, SkippedInput};
use pdfstack::output::{
    OutputFormatter, display_merge_statistics, display_plan, display_selection,
};
use pdfstack::selection::SelectionChange;
use pdfstack::session::{AddOutcome, Session};

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Diagnostics go to stderr; `--log-level` wins over `RUST_LOG`.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);
    let session = Session::new(config)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if cli.interactive {
        return run_interactive(&session, &formatter, &mut input).await;
    }

    let mut patterns = cli.inputs.clone();
    if let Some(list) = &cli.input_list {
        patterns.extend(read_input_list(list).await?);
    }

    let outcome = add_patterns(&session, &formatter, &patterns).await?;
    if session.is_empty()
        && let Some(err) = outcome.rejection()
    {
        return Err(err);
    }

    for index in cli.exclusions() {
        let len = session.len();
        if index >= len {
            return Err(PdfStackError::invalid_config(format!(
                "Cannot exclude position {}: only {len} file(s) selected",
                index + 1
            )));
        }
        if let SelectionChange::Removed { name, .. } = session.remove(index)? {
            formatter.debug(&format!("Excluded {name}"));
        }
    }

    if formatter.is_verbose() {
        formatter.section("Selection");
        display_selection(&formatter, &session.entries());
    }

    if session.config().dry_run {
        let plan = session.plan().await?;
        report_plan(&session, &formatter, &plan, cli.json)?;
        return plan_outcome(&plan, session.config().failure_policy);
    }

    merge_and_write(&session, &formatter, &mut input, cli.json).await
}

/// Read, classify and append everything the patterns match.
async fn add_patterns(
    session: &Session,
    formatter: &OutputFormatter,
    patterns: &[String],
) -> Result<AddOutcome> {
    let reader = FileReader::new();
    let paths = reader.expand_patterns(patterns)?;
    let batch = reader.read_all(&paths).await?;

    let outcome = session.add_files(batch);
    if let Some(err) = outcome.rejection() {
        formatter.warning(&err.to_string());
    }
    if let Some(SelectionChange::Appended { range }) = &outcome.change {
        formatter.debug(&format!("Added {} file(s)", range.len()));
    }
    Ok(outcome)
}

/// Read one path per line from `list`, or from stdin for `-`.
async fn read_input_list(list: &Path) -> Result<Vec<String>> {
    let contents = if list == Path::new("-") {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut contents = String::new();
        while let Some(line) = lines.next_line().await? {
            contents.push_str(&line);
            contents.push('\n');
        }
        contents
    } else {
        tokio::fs::read_to_string(list)
            .await
            .map_err(|e| PdfStackError::FileNotAccessible {
                path: list.to_path_buf(),
                source: e,
            })?
    };

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// JSON summary of a written merge.
#[derive(Serialize)]
struct MergeSummary<'a> {
    output: &'a Path,
    file_size: u64,
    statistics: &'a MergeStatistics,
    skipped: &'a [SkippedInput],
}

/// JSON summary of a dry run.
#[derive(Serialize)]
struct PlanSummary<'a> {
    output: PathBuf,
    plan: &'a MergePlan,
}

/// Merge the session's selection and write it under the next free name.
async fn merge_and_write(
    session: &Session,
    formatter: &OutputFormatter,
    input: &mut InputLines,
    json: bool,
) -> Result<()> {
    let config = session.config();
    let writer = OutputWriter::new();
    let output_dir = &config.output_dir;

    let planned_path = output_dir.join(session.next_file_name());
    writer.can_write(&planned_path).await?;
    confirm_overwrite(&writer, &planned_path, config.overwrite_mode, formatter, input).await?;

    formatter.info(&format!("Merging {} file(s)...", session.len()));
    let merged = session.merge().await?;

    let output_path = output_dir.join(&merged.file_name);
    let write_stats = writer.write(merged.bytes, &output_path).await?;

    if json {
        let summary = MergeSummary {
            output: &output_path,
            file_size: write_stats.file_size,
            statistics: &merged.statistics,
            skipped: &merged.skipped,
        };
        print_json(&summary)?;
    } else {
        display_merge_statistics(
            formatter,
            &output_path.display().to_string(),
            &merged.statistics,
            &merged.skipped,
        );
        formatter.detail("Output size", &write_stats.format_file_size());
        formatter.detail(
            "Write time",
            &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
        );
    }

    Ok(())
}

fn report_plan(
    session: &Session,
    formatter: &OutputFormatter,
    plan: &MergePlan,
    json: bool,
) -> Result<()> {
    let output = session.config().output_dir.join(session.next_file_name());
    if json {
        print_json(&PlanSummary { output, plan })
    } else {
        display_plan(formatter, plan, &output.display().to_string());
        Ok(())
    }
}

/// A dry run fails the same way the real merge would.
fn plan_outcome(plan: &MergePlan, policy: FailurePolicy) -> Result<()> {
    if plan.would_succeed(policy) {
        return Ok(());
    }

    match plan.inputs.iter().find(|i| i.error.is_some()) {
        Some(input) => Err(PdfStackError::source_decode_failure(
            &input.name,
            input.error.clone().unwrap_or_default(),
        )),
        None => Err(PdfStackError::EmptySelection),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| PdfStackError::other(format!("Failed to encode summary: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Whether an existing file at `path` may be replaced.
///
/// Returns `Ok(true)` when the caller has to ask the user.
async fn overwrite_allowed(
    writer: &OutputWriter,
    path: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<bool> {
    if !writer.exists(path).await {
        return Ok(false);
    }

    match mode {
        OverwriteMode::Force => Ok(false),
        OverwriteMode::NoClobber => Err(PdfStackError::output_exists(path.to_path_buf())),
        // Nobody is watching a quiet run, so never block on a prompt.
        OverwriteMode::Prompt if formatter.is_quiet() => {
            Err(PdfStackError::output_exists(path.to_path_buf()))
        }
        OverwriteMode::Prompt => Ok(true),
    }
}

/// Handle output file overwrite scenarios.
async fn confirm_overwrite(
    writer: &OutputWriter,
    path: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
    input: &mut InputLines,
) -> Result<()> {
    if !overwrite_allowed(writer, path, mode, formatter).await? {
        return Ok(());
    }

    formatter.warning(&format!("Output file already exists: {}", path.display()));
    prompt("Overwrite? [y/N]: ").await?;

    match input.next_line().await? {
        Some(answer) if is_yes(&answer) => Ok(()),
        _ => Err(PdfStackError::Cancelled),
    }
}

async fn prompt(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Run the interactive shell until `quit` or end of input.
///
/// Errors from individual commands are reported and the shell carries on.
async fn run_interactive(
    session: &Session,
    formatter: &OutputFormatter,
    input: &mut InputLines,
) -> Result<()> {
    formatter.info(&format!(
        "{} v{} - type 'help' for commands",
        pdfstack::NAME,
        pdfstack::VERSION
    ));

    loop {
        prompt("pdfstack> ").await?;
        let Some(line) = input.next_line().await? else {
            println!();
            return Ok(());
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                formatter.error(&message);
                continue;
            }
        };

        if command == Command::Quit {
            return Ok(());
        }

        if let Err(err) = execute(session, formatter, input, command).await {
            formatter.error(&shell_message(&err));
        }
    }
}

/// Text shown for a failed shell command. Positions are 1-based in the shell.
fn shell_message(err: &PdfStackError) -> String {
    match err {
        PdfStackError::IndexOutOfRange { index, len } => {
            format!("No file at position {} ({len} selected)", index + 1)
        }
        other => other.to_string(),
    }
}

async fn execute(
    session: &Session,
    formatter: &OutputFormatter,
    input: &mut InputLines,
    command: Command,
) -> Result<()> {
    match command {
        Command::Add(patterns) => {
            let outcome = add_patterns(session, formatter, &patterns).await?;
            if let Some(SelectionChange::Appended { range }) = outcome.change {
                formatter.success(&format!(
                    "Added {} file(s); {} selected",
                    range.len(),
                    session.len()
                ));
            }
        }
        Command::Remove(position) => {
            if let SelectionChange::Removed { name, .. } = session.remove(position - 1)? {
                formatter.success(&format!("Removed {name}"));
            }
        }
        Command::List => display_selection(formatter, &session.entries()),
        Command::Merge => merge_and_write(session, formatter, input, false).await?,
        Command::Plan => {
            let plan = session.plan().await?;
            report_plan(session, formatter, &plan, false)?;
        }
        Command::Clear => {
            let cleared = session.clear();
            formatter.success(&format!("Cleared {cleared} file(s)"));
        }
        Command::Help => println!("{HELP}"),
        Command::Quit | Command::Empty => {}
    }
    Ok(())
}
