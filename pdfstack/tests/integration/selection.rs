//! Integration tests for adding, removing and classifying files.

use pdfstack::Config;
use pdfstack::error::PdfStackError;
use pdfstack::selection::SelectionChange;
use pdfstack::session::Session;
use pdfstack::validation::{FileDescriptor, ImageFormat, InputKind};
use rstest::rstest;

use crate::common::{load, page_infos, pdf_bytes, pdf_file, png_file};

fn names(session: &Session) -> Vec<String> {
    session.entries().into_iter().map(|e| e.name).collect()
}

#[rstest]
#[case("application/pdf", Some(InputKind::Pdf))]
#[case("APPLICATION/PDF", Some(InputKind::Pdf))]
#[case("image/jpeg", Some(InputKind::Image(ImageFormat::Jpeg)))]
#[case("image/png; charset=binary", Some(InputKind::Image(ImageFormat::Png)))]
#[case(" image/png ", Some(InputKind::Image(ImageFormat::Png)))]
#[case("image/jpg", None)]
#[case("image/gif", None)]
#[case("text/plain", None)]
#[case("", None)]
fn test_media_type_classification(#[case] media_type: &str, #[case] expected: Option<InputKind>) {
    assert_eq!(InputKind::from_media_type(media_type), expected);
}

#[test]
fn test_mixed_batch_keeps_supported_files() {
    let session = Session::new(Config::default()).unwrap();

    let outcome = session.add_files(vec![
        pdf_file("a.pdf", 1),
        FileDescriptor::new("x.docx", "application/msword", vec![1, 2, 3]),
        png_file("b.png", 2, 2),
        FileDescriptor::new("y.gif", "image/gif", vec![4]),
    ]);

    assert_eq!(names(&session), vec!["a.pdf", "b.png"]);
    assert_eq!(outcome.rejected, vec!["x.docx", "y.gif"]);

    let message = outcome.rejection().unwrap().to_string();
    assert!(message.contains("x.docx"));
    assert!(message.contains("y.gif"));
}

#[test]
fn test_batch_with_nothing_supported_changes_nothing() {
    let session = Session::new(Config::default()).unwrap();

    let outcome = session.add_files(vec![FileDescriptor::new("x.txt", "text/plain", vec![])]);

    assert_eq!(outcome.change, None);
    assert!(session.is_empty());
}

#[test]
fn test_batches_append_in_order() {
    let session = Session::new(Config::default()).unwrap();

    session.add_files(vec![pdf_file("a.pdf", 1), pdf_file("b.pdf", 1)]);
    let outcome = session.add_files(vec![png_file("c.png", 1, 1)]);

    assert_eq!(outcome.change, Some(SelectionChange::Appended { range: 2..3 }));
    assert_eq!(names(&session), vec!["a.pdf", "b.pdf", "c.png"]);
}

#[rstest]
#[case(0, vec!["b.pdf", "c.pdf"])]
#[case(1, vec!["a.pdf", "c.pdf"])]
#[case(2, vec!["a.pdf", "b.pdf"])]
fn test_remove_shifts_later_files(#[case] index: usize, #[case] expected: Vec<&str>) {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![
        pdf_file("a.pdf", 1),
        pdf_file("b.pdf", 1),
        pdf_file("c.pdf", 1),
    ]);

    session.remove(index).unwrap();

    assert_eq!(names(&session), expected);
}

#[test]
fn test_remove_out_of_range() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![pdf_file("a.pdf", 1)]);

    let err = session.remove(5).unwrap_err();

    assert!(matches!(err, PdfStackError::IndexOutOfRange { index: 5, len: 1 }));
    assert_eq!(names(&session), vec!["a.pdf"]);
}

/// A PDF whose `pages` pages are all `side` x `side`.
fn square_pdf(name: &str, side: i64, pages: usize) -> FileDescriptor {
    FileDescriptor::new(name, "application/pdf", pdf_bytes(&vec![(side, side); pages]))
}

#[rstest]
#[case(0, vec!["b.pdf", "c.pdf"], vec![200.0, 200.0, 300.0, 300.0, 300.0])]
#[case(1, vec!["a.pdf", "c.pdf"], vec![100.0, 300.0, 300.0, 300.0])]
#[case(2, vec!["a.pdf", "b.pdf"], vec![100.0, 200.0, 200.0])]
#[tokio::test]
async fn test_removed_file_is_not_merged(
    #[case] index: usize,
    #[case] remaining: Vec<&str>,
    #[case] widths: Vec<f32>,
) {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![
        square_pdf("a.pdf", 100, 1),
        square_pdf("b.pdf", 200, 2),
        square_pdf("c.pdf", 300, 3),
    ]);

    session.remove(index).unwrap();
    assert_eq!(names(&session), remaining);

    let merged = session.merge().await.unwrap();
    assert_eq!(merged.statistics.files_merged, 2);

    let pages = page_infos(&load(&merged.bytes));
    let merged_widths: Vec<f32> = pages.iter().map(|p| p.width).collect();
    let merged_heights: Vec<f32> = pages.iter().map(|p| p.height).collect();
    assert_eq!(merged_widths, widths);
    assert_eq!(merged_heights, widths);
}
