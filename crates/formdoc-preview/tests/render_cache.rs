//! Render cache behavior against a recording engine and the lopdf engine

use std::cell::RefCell;
use std::rc::Rc;

use formdoc_model::{page_sizes, BinarySource, Document, Page, Rgb, Size};
use formdoc_preview::{LopdfEngine, PreviewError, RenderCache, RenderEngine, RenderSession, Surface};
use lopdf::{dictionary, Object, Stream};
use pretty_assertions::assert_eq;

// ============================================================
// Test doubles
// ============================================================

#[derive(Default)]
struct Log {
    opens: usize,
    closes: usize,
    rendered: Vec<(usize, f64)>,
}

struct MockEngine {
    log: Rc<RefCell<Log>>,
}

struct MockSession {
    log: Rc<RefCell<Log>>,
    pages: usize,
}

impl RenderEngine for MockEngine {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn RenderSession>, PreviewError> {
        if bytes == b"broken" {
            return Err(PreviewError::Render("cannot parse".to_string()));
        }
        self.log.borrow_mut().opens += 1;
        Ok(Box::new(MockSession {
            log: Rc::clone(&self.log),
            pages: 2,
        }))
    }
}

impl RenderSession for MockSession {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn page_size(&self, index: usize) -> Result<Size, PreviewError> {
        if index < self.pages {
            Ok(Size::new(100.0, 200.0))
        } else {
            Err(PreviewError::PageOutOfRange {
                index,
                count: self.pages,
            })
        }
    }

    fn render_page(&mut self, index: usize, surface: &mut dyn Surface, scale: f64) -> Result<(), PreviewError> {
        let size = self.page_size(index)?;
        surface.resize(size.scaled(scale));
        surface.fill(Rgb::BLACK);
        self.log.borrow_mut().rendered.push((index, scale));
        Ok(())
    }

    fn close(&mut self) {
        self.log.borrow_mut().closes += 1;
    }
}

#[derive(Default)]
struct RecordingSurface {
    size: Option<Size>,
    fill: Option<Rgb>,
}

impl Surface for RecordingSurface {
    fn resize(&mut self, size: Size) {
        self.size = Some(size);
    }

    fn fill(&mut self, color: Rgb) {
        self.fill = Some(color);
    }
}

fn mock_cache() -> (RenderCache<MockEngine>, Rc<RefCell<Log>>) {
    let log = Rc::new(RefCell::new(Log::default()));
    let engine = MockEngine { log: Rc::clone(&log) };
    (RenderCache::new(engine), log)
}

fn document() -> Document {
    let mut doc = Document::new();
    doc.add_file_reference(BinarySource::Bytes(b"pdf".to_vec()), Some("src".to_string())).unwrap();
    doc.add_file_reference(BinarySource::Bytes(b"broken".to_vec()), Some("bad".to_string())).unwrap();
    doc.add_page(Page::transcluded("src", 0, page_sizes::LETTER));
    doc.add_page(Page::transcluded("src", 1, page_sizes::LETTER));
    doc.add_page(Page::new(Size::new(300.0, 400.0)));
    doc.add_page(Page::transcluded("bad", 0, page_sizes::LETTER));
    doc.add_page(Page::transcluded("src", 5, page_sizes::LEGAL));
    doc
}

// ============================================================
// Session reuse
// ============================================================

#[test]
fn test_session_opened_once_per_reference() {
    let (mut cache, log) = mock_cache();
    let doc = document();
    let mut surface = RecordingSurface::default();

    cache.render_page(&doc, 0, &mut surface, None).unwrap();
    cache.render_page(&doc, 1, &mut surface, Some(2.0)).unwrap();

    assert_eq!(log.borrow().opens, 1);
    assert_eq!(log.borrow().rendered, vec![(0, 1.0), (1, 2.0)]);
    assert_eq!(cache.session_count(), 1);
    assert_eq!(surface.size, Some(Size::new(200.0, 400.0)));
    assert_eq!(surface.fill, Some(Rgb::BLACK));
}

// ============================================================
// Blank fallbacks
// ============================================================

#[test]
fn test_plain_page_renders_blank() {
    let (mut cache, log) = mock_cache();
    let mut surface = RecordingSurface::default();

    cache.render_page(&document(), 2, &mut surface, Some(0.5)).unwrap();

    assert_eq!(surface.size, Some(Size::new(150.0, 200.0)));
    assert_eq!(surface.fill, Some(Rgb::WHITE));
    assert_eq!(log.borrow().opens, 0);
}

#[test]
fn test_failed_reference_is_not_retried() {
    let (mut cache, _log) = mock_cache();
    let doc = document();
    let mut surface = RecordingSurface::default();

    cache.render_page(&doc, 3, &mut surface, None).unwrap();
    assert_eq!(surface.fill, Some(Rgb::WHITE));
    assert_eq!(surface.size, Some(page_sizes::LETTER));
    assert_eq!(cache.session_count(), 0);

    cache.render_page(&doc, 3, &mut surface, None).unwrap();
    assert_eq!(cache.session_count(), 0);
}

#[test]
fn test_out_of_range_source_page_renders_blank() {
    let (mut cache, _log) = mock_cache();
    let mut surface = RecordingSurface::default();

    cache.render_page(&document(), 4, &mut surface, None).unwrap();

    assert_eq!(surface.size, Some(page_sizes::LEGAL));
    assert_eq!(surface.fill, Some(Rgb::WHITE));
}

#[test]
fn test_missing_page_is_an_error() {
    let (mut cache, _log) = mock_cache();
    let mut surface = RecordingSurface::default();
    let err = cache.render_page(&document(), 9, &mut surface, None).unwrap_err();
    assert!(matches!(err, PreviewError::PageNotFound(9)));
}

// ============================================================
// Teardown
// ============================================================

#[test]
fn test_destroy_closes_sessions() {
    let (mut cache, log) = mock_cache();
    let mut surface = RecordingSurface::default();
    cache.render_page(&document(), 0, &mut surface, None).unwrap();

    cache.destroy();
    assert_eq!(log.borrow().closes, 1);
    assert_eq!(cache.session_count(), 0);

    cache.destroy();
    assert_eq!(log.borrow().closes, 1);
}

#[test]
fn test_drop_closes_sessions() {
    let (mut cache, log) = mock_cache();
    let mut surface = RecordingSurface::default();
    cache.render_page(&document(), 0, &mut surface, None).unwrap();
    drop(cache);
    assert_eq!(log.borrow().closes, 1);
}

// ============================================================
// Lopdf engine
// ============================================================

fn source_pdf() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 300.into(), 500.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_lopdf_engine_sizes_from_media_box() {
    let mut doc = Document::new();
    doc.add_file_reference(BinarySource::Bytes(source_pdf()), Some("src".to_string())).unwrap();
    doc.add_page(Page::transcluded("src", 0, page_sizes::LETTER));

    let mut cache = RenderCache::new(LopdfEngine::new());
    let mut surface = RecordingSurface::default();
    cache.render_page(&doc, 0, &mut surface, Some(2.0)).unwrap();

    assert_eq!(surface.size, Some(Size::new(600.0, 1000.0)));
    assert_eq!(surface.fill, Some(Rgb::WHITE));
    assert_eq!(cache.session_count(), 1);
}
