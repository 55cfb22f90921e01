//! Page tree helpers.
//!
//! Source pages are moved under a new page tree when they are copied, so
//! anything they inherit from their old `Pages` ancestors has to be written
//! onto the page itself first. Otherwise a page would silently lose its size,
//! rotation, or resources.

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;

use crate::error::{PdfStackError, Result};

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Letter size, used when a page has no MediaBox anywhere in its ancestry.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Geometry of one output page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageInfo {
    /// MediaBox width in PDF units.
    pub width: f32,
    /// MediaBox height in PDF units.
    pub height: f32,
    /// Rotation in degrees (0, 90, 180 or 270).
    pub rotation: i64,
}

impl PageInfo {
    /// Read the effective geometry of `page_id`, following inheritance.
    pub fn read(doc: &Document, page_id: ObjectId) -> Result<Self> {
        let media_box = inherited(doc, page_id, b"MediaBox")?
            .and_then(|obj| rectangle(doc, obj))
            .unwrap_or(DEFAULT_MEDIA_BOX);

        let rotation = inherited(doc, page_id, b"Rotate")?
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360);

        Ok(Self {
            width: (media_box[2] - media_box[0]).abs(),
            height: (media_box[3] - media_box[1]).abs(),
            rotation,
        })
    }
}

/// Copy inherited attributes down onto each of `page_ids`.
///
/// Attributes the page already defines are left alone; the nearest ancestor
/// wins for everything else.
pub fn materialize_inherited(doc: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    for &page_id in page_ids {
        let mut found = Vec::new();
        for key in INHERITABLE {
            if doc.get_dictionary(page_id).is_ok_and(|page| page.has(key)) {
                continue;
            }
            if let Some(value) = inherited(doc, page_id, key)? {
                found.push((key, value.clone()));
            }
        }

        if found.is_empty() {
            continue;
        }

        let page = doc.get_dictionary_mut(page_id).map_err(|e| {
            PdfStackError::other(format!("Page {page_id:?} is not a dictionary: {e}"))
        })?;
        for (key, value) in found {
            page.set(key, value);
        }
    }

    Ok(())
}

/// Find `key` on the page or its nearest ancestor.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Result<Option<&'a Object>> {
    let mut node: &Dictionary = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfStackError::other(format!("Page {page_id:?} is not a dictionary: {e}")))?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value));
        }
        match node
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|parent| doc.get_dictionary(parent))
        {
            Ok(parent) => node = parent,
            Err(_) => return Ok(None),
        }
    }

    Ok(None)
}

/// Resolve a rectangle array, following a reference if needed.
fn rectangle(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let obj = match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let values = obj.as_array().ok()?;
    if values.len() < 4 {
        return None;
    }

    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = value.as_float().ok()?;
    }
    Some(rect)
}
