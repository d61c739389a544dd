//! Copying pages out of referenced source documents
//!
//! Each file reference is parsed at most once per run. Copying a page pulls
//! in the objects it depends on (content streams, resources, annotations);
//! those are shared between copies of pages from the same source, while the
//! page dictionary itself is copied fresh every time.

use std::collections::HashMap;

use formdoc_model::{FileReference, Size};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::GenerateError;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

struct LoadedSource {
    doc: Document,
    pages: Vec<ObjectId>,
    /// Source object id to output object id
    copied: HashMap<ObjectId, ObjectId>,
}

pub struct SourceCache<'a> {
    references: &'a [FileReference],
    loaded: HashMap<String, LoadedSource>,
}

impl<'a> SourceCache<'a> {
    pub fn new(references: &'a [FileReference]) -> Self {
        Self {
            references,
            loaded: HashMap::new(),
        }
    }

    /// Number of sources parsed so far
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    fn load(&mut self, page_no: usize, ref_id: &str) -> Result<&mut LoadedSource, GenerateError> {
        if !self.loaded.contains_key(ref_id) {
            let reference = self
                .references
                .iter()
                .find(|r| r.ref_id == ref_id)
                .ok_or_else(|| GenerateError::FileReferenceNotFound {
                    page: page_no,
                    ref_id: ref_id.to_string(),
                })?;

            let invalid = |reason: String| GenerateError::InvalidSource {
                ref_id: ref_id.to_string(),
                reason,
            };
            let bytes = reference.src.decode().map_err(|e| invalid(e.to_string()))?;
            let doc = Document::load_mem(&bytes).map_err(|e| invalid(e.to_string()))?;
            let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            tracing::debug!(ref_id = %ref_id, pages = pages.len(), "Loaded file reference");

            self.loaded.insert(
                ref_id.to_string(),
                LoadedSource {
                    doc,
                    pages,
                    copied: HashMap::new(),
                },
            );
        }
        self.loaded
            .get_mut(ref_id)
            .ok_or_else(|| GenerateError::FileReferenceNotFound {
                page: page_no,
                ref_id: ref_id.to_string(),
            })
    }

    /// Copy page `index` of source `ref_id` into `out` as a child of
    /// `parent`. Returns the new page id and its size.
    pub fn copy_page(
        &mut self,
        out: &mut Document,
        page_no: usize,
        ref_id: &str,
        index: usize,
        parent: ObjectId,
    ) -> Result<(ObjectId, Size), GenerateError> {
        let source = self.load(page_no, ref_id)?;
        let src_page_id = *source
            .pages
            .get(index)
            .ok_or_else(|| GenerateError::ReferencePageOutOfRange {
                ref_id: ref_id.to_string(),
                index,
                count: source.pages.len(),
            })?;

        // Resolve inherited attributes onto the page itself
        let mut page = source.doc.get_object(src_page_id)?.as_dict()?.clone();
        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(&source.doc, src_page_id, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
        page.remove(b"Parent");

        // Annotations point back at their page through /P
        let page_id = out.new_object_id();
        let previous = source.copied.insert(src_page_id, page_id);

        let mut copier = Copier {
            src: &source.doc,
            out,
            copied: &mut source.copied,
        };
        let mut copy = Dictionary::new();
        for (key, value) in page.iter() {
            copy.set(key.clone(), copier.copy(value));
        }
        copy.set("Parent", Object::Reference(parent));

        match previous {
            Some(prev) => source.copied.insert(src_page_id, prev),
            None => source.copied.remove(&src_page_id),
        };

        let size = media_box_size(&copy).unwrap_or(formdoc_model::page_sizes::A4);
        out.objects.insert(page_id, Object::Dictionary(copy));
        tracing::debug!(ref_id = %ref_id, index, ?page_id, "Copied source page");
        Ok((page_id, size))
    }
}

struct Copier<'s, 'o> {
    src: &'s Document,
    out: &'o mut Document,
    copied: &'o mut HashMap<ObjectId, ObjectId>,
}

impl Copier<'_, '_> {
    fn copy(&mut self, obj: &Object) -> Object {
        match obj {
            Object::Reference(id) => self.copy_reference(*id),
            Object::Array(arr) => Object::Array(arr.iter().map(|o| self.copy(o)).collect()),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dict(dict)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.copy_dict(&stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn copy_dict(&mut self, dict: &Dictionary) -> Dictionary {
        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            out.set(key.clone(), self.copy(value));
        }
        out
    }

    fn copy_reference(&mut self, id: ObjectId) -> Object {
        if let Some(new_id) = self.copied.get(&id) {
            return Object::Reference(*new_id);
        }
        let Ok(target) = self.src.get_object(id) else {
            return Object::Null;
        };
        // Other pages of the source are never pulled in
        if is_page_node(target) {
            return Object::Null;
        }

        let new_id = self.out.new_object_id();
        self.copied.insert(id, new_id);
        let copy = self.copy(target);
        self.out.objects.insert(new_id, copy);
        Object::Reference(new_id)
    }
}

fn is_page_node(obj: &Object) -> bool {
    let dict = match obj {
        Object::Dictionary(dict) => dict,
        _ => return false,
    };
    matches!(dict.get(b"Type"), Ok(Object::Name(n)) if n == b"Page" || n == b"Pages")
}

/// Walk up the page tree looking for `key`
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    // Bounded to survive malformed, cyclic trees
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Size of an inline `[x0 y0 x1 y1]` media box
pub(crate) fn media_box_size(page: &Dictionary) -> Option<Size> {
    let arr = page.get(b"MediaBox").ok()?.as_array().ok()?;
    box_size(arr)
}

pub(crate) fn box_size(arr: &[Object]) -> Option<Size> {
    if arr.len() != 4 {
        return None;
    }
    let v: Vec<f64> = arr.iter().filter_map(number).collect();
    if v.len() != 4 {
        return None;
    }
    Some(Size::new((v[2] - v[0]).abs(), (v[3] - v[1]).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formdoc_model::BinarySource;
    use lopdf::{dictionary, Stream};

    /// Two pages that inherit their MediaBox from the page tree root
    fn source_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let mut kids = Vec::new();
        for label in ["first", "second"] {
            let content = format!("BT /F1 12 Tf 50 700 Td ({label}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 2,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn references() -> Vec<FileReference> {
        vec![FileReference {
            ref_id: "src".to_string(),
            src: BinarySource::Bytes(source_pdf()),
        }]
    }

    #[test]
    fn test_copy_resolves_inherited_media_box() {
        let refs = references();
        let mut cache = SourceCache::new(&refs);
        let mut out = Document::with_version("1.7");
        let parent = out.new_object_id();

        let (page_id, size) = cache.copy_page(&mut out, 0, "src", 1, parent).unwrap();
        assert_eq!(size, Size::new(300.0, 400.0));

        let page = out.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page.get(b"MediaBox").is_ok());
        assert!(matches!(page.get(b"Parent"), Ok(Object::Reference(id)) if *id == parent));
    }

    #[test]
    fn test_shared_objects_are_copied_once() {
        let refs = references();
        let mut cache = SourceCache::new(&refs);
        let mut out = Document::with_version("1.7");
        let parent = out.new_object_id();

        let (first, _) = cache.copy_page(&mut out, 0, "src", 0, parent).unwrap();
        let objects_after_first = out.objects.len();
        let (second, _) = cache.copy_page(&mut out, 1, "src", 0, parent).unwrap();
        assert_ne!(first, second);
        // Only the page dictionary is new; content and font are shared
        assert_eq!(out.objects.len(), objects_after_first + 1);
        assert_eq!(cache.loaded_count(), 1);
    }

    #[test]
    fn test_missing_reference() {
        let refs = references();
        let mut cache = SourceCache::new(&refs);
        let mut out = Document::with_version("1.7");
        let err = cache.copy_page(&mut out, 3, "nope", 0, (1, 0)).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::FileReferenceNotFound { page: 3, ref_id } if ref_id == "nope"
        ));
    }

    #[test]
    fn test_page_index_out_of_range() {
        let refs = references();
        let mut cache = SourceCache::new(&refs);
        let mut out = Document::with_version("1.7");
        let err = cache.copy_page(&mut out, 0, "src", 5, (1, 0)).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::ReferencePageOutOfRange { index: 5, count: 2, .. }
        ));
    }

    #[test]
    fn test_garbage_source_is_invalid() {
        let refs = vec![FileReference {
            ref_id: "bad".to_string(),
            src: BinarySource::Bytes(b"not a pdf".to_vec()),
        }];
        let mut cache = SourceCache::new(&refs);
        let mut out = Document::with_version("1.7");
        assert!(matches!(
            cache.copy_page(&mut out, 0, "bad", 0, (1, 0)),
            Err(GenerateError::InvalidSource { .. })
        ));
    }
}
