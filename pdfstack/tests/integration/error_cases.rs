//! Integration tests for error handling.

use pdfstack::config::Config;
use pdfstack::error::PdfStackError;
use pdfstack::io::FileReader;
use pdfstack::session::Session;
use pdfstack::validation::FileDescriptor;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{corrupt_pdf_file, pdf_file, png_bytes, write_file};

#[tokio::test]
async fn test_merge_with_nothing_selected() {
    let session = Session::new(Config::default()).unwrap();

    let err = session.merge().await.unwrap_err();

    assert!(matches!(err, PdfStackError::EmptySelection));
    assert!(err.is_recoverable());
    assert_eq!(session.merges_completed(), 0);
}

#[tokio::test]
async fn test_everything_removed_then_merge() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![pdf_file("a.pdf", 1)]);
    session.remove(0).unwrap();

    assert!(matches!(
        session.merge().await,
        Err(PdfStackError::EmptySelection)
    ));
}

#[tokio::test]
async fn test_corrupt_pdf_names_the_file() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![pdf_file("fine.pdf", 2), corrupt_pdf_file("broken.pdf")]);

    let err = session.merge().await.unwrap_err();

    assert!(err.to_string().contains("broken.pdf"));
    assert_eq!(err.exit_code(), 3);
}

#[rstest]
#[case("image/png", b"\x89PNG\r\n\x1a\n".to_vec())]
#[case("image/jpeg", b"\xFF\xD8\xFF\xE0 truncated".to_vec())]
#[case("image/jpeg", Vec::new())]
#[tokio::test]
async fn test_corrupt_image_fails_decode(#[case] media_type: &str, #[case] bytes: Vec<u8>) {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![FileDescriptor::new("bad-image", media_type, bytes)]);

    let err = session.merge().await.unwrap_err();
    assert!(
        matches!(err, PdfStackError::SourceDecodeFailure { ref name, .. } if name == "bad-image")
    );
}

#[tokio::test]
async fn test_png_declared_as_jpeg_fails_decode() {
    let session = Session::new(Config::default()).unwrap();
    session.add_files(vec![FileDescriptor::new("liar.jpg", "image/jpeg", png_bytes(4, 4))]);

    assert!(matches!(
        session.merge().await,
        Err(PdfStackError::SourceDecodeFailure { .. })
    ));
}

#[tokio::test]
async fn test_reading_missing_and_directory_paths() {
    let dir = TempDir::new().unwrap();
    let reader = FileReader::new();

    let err = reader.read(&dir.path().join("nope.pdf")).await.unwrap_err();
    assert!(matches!(err, PdfStackError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);

    let err = reader.read(dir.path()).await.unwrap_err();
    assert!(matches!(err, PdfStackError::NotAFile { .. }));
}

#[tokio::test]
async fn test_read_all_stops_at_first_missing_file() {
    let dir = TempDir::new().unwrap();
    let present = write_file(dir.path(), "a.png", &png_bytes(1, 1));
    let missing = dir.path().join("b.png");

    let err = FileReader::new()
        .read_all(&[present, missing.clone()])
        .await
        .unwrap_err();

    assert!(matches!(err, PdfStackError::FileNotFound { ref path } if *path == missing));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = Config {
        extension: "p.df".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        Session::new(config),
        Err(PdfStackError::InvalidConfig { .. })
    ));
}
