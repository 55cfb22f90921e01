//! Document information dictionary for merged output.
//!
//! Every merged document gets Producer, Creator, CreationDate and ModDate;
//! Title, Author, Subject and Keywords are only written when configured.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::config::Metadata;

/// Value written to the Producer and Creator entries.
pub const PRODUCER: &str = concat!("pdfstack ", env!("CARGO_PKG_VERSION"));

/// Writes and reads the Info dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Attach a fresh Info dictionary to `doc`.
    ///
    /// Replaces any existing Info reference in the trailer.
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata, now: DateTime<Utc>) {
        let mut info = Dictionary::new();

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text(value));
            }
        }

        info.set("Creator", text(PRODUCER));
        info.set("Producer", text(PRODUCER));

        let date = format_pdf_date(now);
        info.set("CreationDate", text(&date));
        info.set("ModDate", text(&date));

        let info_id = doc.add_object(info);
        doc.trailer.set("Info", Object::Reference(info_id));
    }

    /// Read the user-facing fields back from a document.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok()
        else {
            return Metadata::default();
        };

        Metadata::new(
            string_field(info, b"Title"),
            string_field(info, b"Author"),
            string_field(info, b"Subject"),
            string_field(info, b"Keywords"),
        )
    }
}

fn text(value: &str) -> Object {
    Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
}

fn string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::String(bytes, _)) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Format a UTC timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}
