//! Integration tests for planning a merge without producing output.

use pdfstack::config::{Config, FailurePolicy};
use pdfstack::error::PdfStackError;
use pdfstack::session::Session;
use pdfstack::validation::{ImageFormat, InputKind};

use crate::common::{corrupt_pdf_file, jpeg_file, pdf_file};

#[tokio::test]
async fn test_plan_counts_pages_without_using_a_name() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![pdf_file("a.pdf", 4), jpeg_file("b.jpg", 20, 10)]);

    let plan = session.plan().await.unwrap();

    assert_eq!(plan.total_pages, 5);
    assert_eq!(plan.inputs[1].kind, InputKind::Image(ImageFormat::Jpeg));
    assert_eq!(plan.inputs[1].pages, 1);
    assert!(plan.would_succeed(FailurePolicy::Abort));
    assert_eq!(session.merges_completed(), 0);
    assert_eq!(session.next_file_name(), "dot.pdf");
}

#[tokio::test]
async fn test_plan_reports_unreadable_inputs() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![corrupt_pdf_file("bad.pdf"), pdf_file("ok.pdf", 2)]);

    let plan = session.plan().await.unwrap();

    assert_eq!(plan.failed(), 1);
    assert_eq!(plan.total_pages, 2);
    assert!(plan.inputs[0].error.is_some());
    assert!(!plan.would_succeed(FailurePolicy::Abort));
    assert!(plan.would_succeed(FailurePolicy::Skip));
}

#[tokio::test]
async fn test_plan_of_empty_selection() {
    let session = Session::new(Config::default()).unwrap();
    let err = session.plan().await.unwrap_err();
    assert!(matches!(err, PdfStackError::EmptySelection));
}

#[tokio::test]
async fn test_plan_serializes_to_json() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![pdf_file("a.pdf", 1), corrupt_pdf_file("bad.pdf")]);

    let plan = session.plan().await.unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["total_pages"], 1);
    assert_eq!(json["inputs"][0]["kind"], "pdf");
    assert!(json["inputs"][0].get("error").is_none());
    assert!(json["inputs"][1]["error"].is_string());
}
