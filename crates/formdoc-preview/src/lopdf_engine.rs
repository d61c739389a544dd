//! Metadata-only engine: reads page geometry with lopdf and paints blank
//! sheets of the right size

use formdoc_model::{Rgb, Size};
use lopdf::{Document, Object, ObjectId};

use crate::engine::{RenderEngine, RenderSession, Surface};
use crate::error::PreviewError;

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RenderEngine for LopdfEngine {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn RenderSession>, PreviewError> {
        let doc = Document::load_mem(bytes)?;
        let pages = doc.get_pages().into_values().collect();
        Ok(Box::new(LopdfSession { doc, pages }))
    }
}

pub struct LopdfSession {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl LopdfSession {
    fn page_id(&self, index: usize) -> Result<ObjectId, PreviewError> {
        self.pages
            .get(index)
            .copied()
            .ok_or(PreviewError::PageOutOfRange {
                index,
                count: self.pages.len(),
            })
    }
}

impl RenderSession for LopdfSession {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> Result<Size, PreviewError> {
        let page_id = self.page_id(index)?;
        let media_box = inherited_media_box(&self.doc, page_id)
            .ok_or_else(|| PreviewError::Render(format!("page {index} has no MediaBox")))?;
        box_size(&media_box).ok_or_else(|| PreviewError::Render(format!("page {index} has a malformed MediaBox")))
    }

    fn render_page(&mut self, index: usize, surface: &mut dyn Surface, scale: f64) -> Result<(), PreviewError> {
        let size = self.page_size(index)?;
        surface.resize(size.scaled(scale));
        surface.fill(Rgb::WHITE);
        Ok(())
    }

    fn close(&mut self) {
        self.pages.clear();
        self.doc = Document::new();
    }
}

fn inherited_media_box(doc: &Document, page_id: ObjectId) -> Option<Vec<Object>> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..64 {
        if let Ok(value) = current.get(b"MediaBox") {
            let value = match value {
                Object::Reference(id) => doc.get_object(*id).ok()?,
                other => other,
            };
            return value.as_array().ok().cloned();
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn box_size(arr: &[Object]) -> Option<Size> {
    let v: Vec<f64> = arr
        .iter()
        .filter_map(|o| match o {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        })
        .collect();
    match v.as_slice() {
        [x0, y0, x1, y1] => Some(Size::new((x1 - x0).abs(), (y1 - y0).abs())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_size() {
        let arr = vec![Object::Integer(0), Object::Integer(0), Object::Real(300.0), Object::Integer(400)];
        assert_eq!(box_size(&arr), Some(Size::new(300.0, 400.0)));
        assert_eq!(box_size(&arr[..3]), None);
    }

    #[test]
    fn test_garbage_fails_to_open() {
        assert!(LopdfEngine::new().open(b"not a pdf").is_err());
    }
}
