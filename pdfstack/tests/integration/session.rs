//! Integration tests for output naming and merge isolation.

use pdfstack::config::{Config, FailurePolicy};
use pdfstack::error::PdfStackError;
use pdfstack::io::{FileReader, OutputWriter};
use pdfstack::session::Session;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{corrupt_pdf_file, load, pdf_bytes, pdf_file, png_bytes, write_file};

#[tokio::test]
async fn test_names_advance_per_successful_merge() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![pdf_file("a.pdf", 1)]);

    let mut names = Vec::new();
    for _ in 0..3 {
        names.push(session.merge().await.unwrap().file_name);
    }

    assert_eq!(names, vec!["dot.pdf", "dot(1).pdf", "dot(2).pdf"]);
    assert_eq!(session.merges_completed(), 3);
}

#[tokio::test]
async fn test_failed_merge_keeps_name_and_selection() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![pdf_file("good.pdf", 1), corrupt_pdf_file("bad.pdf")]);

    let err = session.merge().await.unwrap_err();
    assert!(
        matches!(err, PdfStackError::SourceDecodeFailure { ref name, .. } if name == "bad.pdf")
    );
    assert_eq!(session.len(), 2);
    assert_eq!(session.next_file_name(), "dot.pdf");

    session.remove(1).unwrap();
    assert_eq!(session.merge().await.unwrap().file_name, "dot.pdf");
}

#[tokio::test]
async fn test_custom_base_name() {
    let config = Config {
        base_name: "scans".to_string(),
        ..Config::default()
    };
    let session = Session::new(config).unwrap();
    session.add_files(vec![pdf_file("a.pdf", 1)]);

    assert_eq!(session.merge().await.unwrap().file_name, "scans.pdf");
    assert_eq!(session.next_file_name(), "scans(1).pdf");
}

#[tokio::test]
async fn test_skip_policy_reports_skipped_inputs() {
    let config = Config {
        failure_policy: FailurePolicy::Skip,
        ..Config::default()
    };
    let session = Session::new(config).unwrap();
    session.add_files(vec![
        pdf_file("a.pdf", 2),
        corrupt_pdf_file("bad.pdf"),
        pdf_file("c.pdf", 1),
    ]);

    let merged = session.merge().await.unwrap();

    assert_eq!(merged.file_name, "dot.pdf");
    assert_eq!(merged.statistics.total_pages, 3);
    assert_eq!(merged.skipped.len(), 1);
    assert_eq!(merged.skipped[0].name, "bad.pdf");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mutation_during_merge_does_not_affect_it() {
    let session = Arc::new(Session::new(Config::default()).unwrap());
    session.add_files((0..20).map(|i| pdf_file(&format!("{i}.pdf"), 5)).collect());

    let merging = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.merge().await })
    };

    // Whatever happens to the selection now, the running merge already holds
    // its snapshot of all 20 files, or has not started and will see them.
    session.add_files(vec![pdf_file("late.pdf", 1)]);
    let merged = merging.await.unwrap().unwrap();

    let pages = load(&merged.bytes).get_pages().len();
    assert!(pages == 100 || pages == 101, "unexpected page count {pages}");
    assert_eq!(session.len(), 21);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_merges_are_rejected_or_serialized() {
    let session = Arc::new(Session::new(Config::default()).unwrap());
    session.add_files((0..10).map(|i| pdf_file(&format!("{i}.pdf"), 10)).collect());

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.merge().await })
    };
    let second = session.merge().await;
    let first = first.await.unwrap();

    let results = [first, second];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(PdfStackError::MergeInProgress)))
        .count();

    assert_eq!(succeeded + rejected, 2);
    assert!(succeeded >= 1);
    assert_eq!(session.merges_completed(), succeeded as u64);
    assert!(!session.is_merging());
}

#[tokio::test]
async fn test_files_from_disk_to_disk() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path();
    write_file(input_dir, "01-cover.pdf", &pdf_bytes(&[(612, 792)]));
    write_file(input_dir, "02-photo.png", &png_bytes(320, 240));
    write_file(input_dir, "03-notes.txt", b"not merged");

    let reader = FileReader::new();
    let pattern = format!("{}/*", input_dir.display());
    let paths = reader.expand_patterns([pattern]).unwrap();
    let batch = reader.read_all(&paths).await.unwrap();

    let session = Session::new(Config::default()).unwrap();
    let outcome = session.add_files(batch);
    assert_eq!(outcome.rejected, vec!["03-notes.txt"]);

    let merged = session.merge().await.unwrap();
    let output = dir.path().join(&merged.file_name);
    let stats = OutputWriter::new().write(merged.bytes, &output).await.unwrap();

    assert_eq!(stats.output_path, output);
    let written = std::fs::read(&output).unwrap();
    assert_eq!(load(&written).get_pages().len(), 2);
}
