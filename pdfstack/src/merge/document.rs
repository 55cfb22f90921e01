//! The document being assembled by a merge.
//!
//! [`DocumentBuilder`] owns a fresh `lopdf` document with a single page tree.
//! Sources are appended whole: a PDF source is fully parsed before any of its
//! objects are moved in, and an image is fully decoded before its page is
//! created, so a failing source never leaves pages behind.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use serde::Serialize;
use std::ops::Range;

use crate::config::Metadata;
use crate::error::{PdfStackError, Result};
use crate::merge::image::DecodedImage;
use crate::merge::metadata::MetadataManager;
use crate::merge::pages::{PageInfo, materialize_inherited};
use crate::validation::InputKind;

/// PDF version written into assembled documents.
const OUTPUT_VERSION: &str = "1.7";

/// Resource name of the image drawn on synthesized pages.
const IMAGE_RESOURCE: &str = "Im0";

/// Pages contributed by one selected input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageGroup {
    /// Display name of the input.
    pub name: String,
    /// Classified kind of the input.
    pub kind: InputKind,
    /// Zero-based output page positions, contiguous.
    pub pages: Range<usize>,
}

/// Incrementally assembled output document.
pub(crate) struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    groups: Vec<PageGroup>,
}

impl DocumentBuilder {
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version(OUTPUT_VERSION);
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Move every page of `source`, in order, to the end of the output.
    ///
    /// Returns the number of pages added.
    pub(crate) fn append_pdf(&mut self, name: &str, mut source: Document) -> Result<usize> {
        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        materialize_inherited(&mut source, &source_pages)?;

        source.renumber_objects_with(self.doc.max_id + 1);
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        self.doc.max_id = self.doc.max_id.max(source.max_id);

        for (id, object) in source.objects {
            match object_type(&object).as_deref() {
                // Replaced by the output's own catalog and page tree.
                Some(b"Catalog") | Some(b"Pages") | Some(b"Outlines") | Some(b"Outline") => {}
                _ => {
                    self.doc.objects.insert(id, object);
                }
            }
        }

        for &page_id in &page_ids {
            if let Ok(page) = self.doc.get_dictionary_mut(page_id) {
                page.set("Parent", self.pages_id);
            }
        }

        self.push_group(name, InputKind::Pdf, &page_ids);
        Ok(page_ids.len())
    }

    /// Add one page exactly the size of `image`, with the image covering it.
    pub(crate) fn append_image(
        &mut self,
        name: &str,
        kind: InputKind,
        image: DecodedImage,
    ) -> Result<()> {
        let DecodedImage {
            width,
            height,
            mut xobject,
            soft_mask,
        } = image;

        if let Some(mask) = soft_mask {
            let mask_id = self.doc.add_object(mask);
            xobject.dict.set("SMask", mask_id);
        }
        let image_id = self.doc.add_object(xobject);

        let width = i64::from(width);
        let height = i64::from(height);

        // Scale the unit image square to the full page, anchored at the origin.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0.into(),
                        0.into(),
                        height.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE => image_id,
                },
            },
            "Contents" => content_id,
        });

        self.push_group(name, kind, &[page_id]);
        Ok(())
    }

    fn push_group(&mut self, name: &str, kind: InputKind, page_ids: &[ObjectId]) {
        let start = self.kids.len();
        self.kids.extend_from_slice(page_ids);

        tracing::debug!(
            name,
            %kind,
            pages = page_ids.len(),
            first_page = start + 1,
            "appended page group"
        );

        self.groups.push(PageGroup {
            name: name.to_string(),
            kind,
            pages: start..self.kids.len(),
        });
    }

    /// Close the page tree and attach the catalog and Info dictionary.
    pub(crate) fn finish(mut self, metadata: &Metadata, now: DateTime<Utc>) -> OutputDocument {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;

        self.doc.objects.insert(
            self.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }
            .into(),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        MetadataManager::new().set_metadata(&mut self.doc, metadata, now);

        OutputDocument {
            doc: self.doc,
            page_ids: self.kids,
            groups: self.groups,
        }
    }
}

/// A fully assembled merge result.
pub struct OutputDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
    groups: Vec<PageGroup>,
}

impl OutputDocument {
    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Which pages each input contributed, in selection order.
    pub fn groups(&self) -> &[PageGroup] {
        &self.groups
    }

    /// Geometry of every page, in order.
    pub fn pages(&self) -> Result<Vec<PageInfo>> {
        self.page_ids
            .iter()
            .map(|&id| PageInfo::read(&self.doc, id))
            .collect()
    }

    /// The underlying `lopdf` document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serialize the whole document into one PDF byte stream.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::FailedToSerialize`] if `lopdf` cannot write
    /// the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| PdfStackError::failed_to_serialize(e.to_string()))?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for OutputDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDocument")
            .field("pages", &self.page_ids.len())
            .field("groups", &self.groups)
            .finish()
    }
}

/// `/Type` of a dictionary or stream object, if present.
fn object_type(object: &Object) -> Option<Vec<u8>> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type")
        .and_then(Object::as_name)
        .ok()
        .map(<[u8]>::to_vec)
}
