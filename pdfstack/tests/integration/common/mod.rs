//! Shared fixtures for the integration tests.
//!
//! Every fixture is generated in memory: PDFs with `lopdf`, images with
//! `image`. Nothing is read from disk unless a test writes it first.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use pdfstack::merge::PageInfo;
use pdfstack::validation::FileDescriptor;

/// A PDF with one page per entry of `sizes`, each with a small text stream.
pub fn pdf_bytes(sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(width, height))| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![10.into(), 10.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("page {}", i + 1))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            })
            .into()
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }.into(),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    save(doc)
}

/// A two-page PDF whose pages take MediaBox and Rotate from their parent.
pub fn inheriting_pdf_bytes() -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..2)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            })
            .into()
        })
        .collect();
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 2,
            "MediaBox" => vec![0.into(), 0.into(), 420.into(), 595.into()],
            "Rotate" => 90,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    save(doc)
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// An opaque RGB PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 90, 160]))),
        ImageFormat::Png,
    )
}

/// A PNG with a half-transparent alpha channel.
pub fn png_with_alpha_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 128]))),
        ImageFormat::Png,
    )
}

/// A baseline RGB JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([250, 200, 0]))),
        ImageFormat::Jpeg,
    )
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// A PDF descriptor with `pages` Letter-sized pages.
pub fn pdf_file(name: &str, pages: usize) -> FileDescriptor {
    FileDescriptor::new(name, "application/pdf", pdf_bytes(&vec![(612, 792); pages]))
}

/// A PNG descriptor.
pub fn png_file(name: &str, width: u32, height: u32) -> FileDescriptor {
    FileDescriptor::new(name, "image/png", png_bytes(width, height))
}

/// A JPEG descriptor.
pub fn jpeg_file(name: &str, width: u32, height: u32) -> FileDescriptor {
    FileDescriptor::new(name, "image/jpeg", jpeg_bytes(width, height))
}

/// A descriptor that claims to be a PDF but is not one.
pub fn corrupt_pdf_file(name: &str) -> FileDescriptor {
    FileDescriptor::new(name, "application/pdf", b"%PDF-1.7\nthis is not a pdf".to_vec())
}

/// Parse merged output back into a document.
pub fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).expect("merged output should parse")
}

/// Geometry of every page of a parsed document, in order.
pub fn page_infos(doc: &Document) -> Vec<PageInfo> {
    doc.get_pages()
        .into_values()
        .map(|id| PageInfo::read(doc, id).unwrap())
        .collect()
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
