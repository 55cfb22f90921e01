//! Integration tests for merging PDFs and images end to end.

use pdfstack::config::{Config, Metadata};
use pdfstack::merge::MetadataManager;
use pdfstack::session::Session;
use pdfstack::validation::FileDescriptor;

use crate::common::{
    inheriting_pdf_bytes, jpeg_file, load, page_infos, pdf_bytes, pdf_file, png_file,
    png_with_alpha_bytes,
};

fn session() -> Session {
    Session::new(Config::default()).unwrap()
}

#[tokio::test]
async fn test_page_count_is_sum_of_inputs() {
    let session = session();
    session.add_files(vec![
        pdf_file("a.pdf", 3),
        png_file("b.png", 10, 10),
        pdf_file("c.pdf", 2),
        jpeg_file("d.jpg", 8, 8),
    ]);

    let merged = session.merge().await.unwrap();

    assert_eq!(merged.statistics.total_pages, 7);
    assert_eq!(load(&merged.bytes).get_pages().len(), 7);
}

#[tokio::test]
async fn test_pages_follow_selection_order() {
    let session = session();
    session.add_files(vec![
        FileDescriptor::new("wide.pdf", "application/pdf", pdf_bytes(&[(800, 200)])),
        png_file("photo.png", 30, 40),
        FileDescriptor::new(
            "mixed.pdf",
            "application/pdf",
            pdf_bytes(&[(100, 100), (200, 300)]),
        ),
    ]);

    let merged = session.merge().await.unwrap();

    let sizes: Vec<(f32, f32)> = page_infos(&load(&merged.bytes))
        .iter()
        .map(|p| (p.width, p.height))
        .collect();
    assert_eq!(
        sizes,
        vec![(800.0, 200.0), (30.0, 40.0), (100.0, 100.0), (200.0, 300.0)]
    );
}

#[tokio::test]
async fn test_image_page_matches_pixel_size() {
    let session = session();
    session.add_files(vec![png_file("scan.png", 800, 600)]);

    let merged = session.merge().await.unwrap();

    let doc = load(&merged.bytes);
    let pages = page_infos(&doc);
    assert_eq!(pages.len(), 1);
    assert_eq!((pages[0].width, pages[0].height), (800.0, 600.0));
}

#[tokio::test]
async fn test_jpeg_is_embedded_as_dct() {
    let session = session();
    session.add_files(vec![jpeg_file("photo.jpg", 64, 48)]);

    let merged = session.merge().await.unwrap();

    let doc = load(&merged.bytes);
    let has_dct_image = doc.objects.values().any(|object| {
        object.as_stream().is_ok_and(|stream| {
            stream
                .dict
                .get(b"Filter")
                .and_then(|f| f.as_name())
                .is_ok_and(|name| name == b"DCTDecode")
        })
    });
    assert!(has_dct_image);
}

#[tokio::test]
async fn test_png_alpha_gets_soft_mask() {
    let session = session();
    session.add_files(vec![FileDescriptor::new(
        "logo.png",
        "image/png",
        png_with_alpha_bytes(16, 16),
    )]);

    let merged = session.merge().await.unwrap();

    let doc = load(&merged.bytes);
    let has_soft_mask = doc.objects.values().any(|object| {
        object
            .as_stream()
            .is_ok_and(|stream| stream.dict.has(b"SMask"))
    });
    assert!(has_soft_mask);
}

#[tokio::test]
async fn test_inherited_attributes_survive() {
    let session = session();
    session.add_files(vec![
        pdf_file("first.pdf", 1),
        FileDescriptor::new("inherits.pdf", "application/pdf", inheriting_pdf_bytes()),
    ]);

    let merged = session.merge().await.unwrap();

    let pages = page_infos(&load(&merged.bytes));
    assert_eq!(pages.len(), 3);
    for page in &pages[1..] {
        assert_eq!((page.width, page.height, page.rotation), (420.0, 595.0, 90));
    }
}

#[tokio::test]
async fn test_same_file_selected_twice() {
    let session = session();
    let file = pdf_file("twice.pdf", 2);
    session.add_files(vec![file.clone(), file]);

    let merged = session.merge().await.unwrap();
    assert_eq!(load(&merged.bytes).get_pages().len(), 4);
}

#[tokio::test]
async fn test_metadata_from_config() {
    let config = Config {
        metadata: Metadata::new(
            Some("Receipts".to_string()),
            Some("Accounts".to_string()),
            None,
            Some("2024, tax".to_string()),
        ),
        ..Config::default()
    };
    let session = Session::new(config.clone()).unwrap();
    session.add_files(vec![pdf_file("a.pdf", 1)]);

    let merged = session.merge().await.unwrap();

    let read = MetadataManager::new().get_metadata(&load(&merged.bytes));
    assert_eq!(read, config.metadata);
}
