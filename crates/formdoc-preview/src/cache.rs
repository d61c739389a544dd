//! Render sessions per file reference, opened lazily and kept until
//! [`RenderCache::destroy`]

use std::collections::HashMap;

use formdoc_model::{page_sizes, Document, Page, Rgb};
use tracing::{debug, warn};

use crate::engine::{RenderEngine, RenderSession, Surface};
use crate::error::PreviewError;

const DEFAULT_SCALE: f64 = 1.0;

enum Slot {
    Open(Box<dyn RenderSession>),
    /// Opening failed; pages of this reference render blank
    Failed,
}

pub struct RenderCache<E: RenderEngine> {
    engine: E,
    sessions: HashMap<String, Slot>,
}

impl<E: RenderEngine> RenderCache<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            sessions: HashMap::new(),
        }
    }

    /// Number of sessions currently open
    pub fn session_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|slot| matches!(slot, Slot::Open(_)))
            .count()
    }

    /// Paint page `page_index` of `document` onto `surface`.
    ///
    /// Transcluded pages are delegated to the session of their reference;
    /// every other page, and any transcluded page that cannot be rendered,
    /// becomes a white sheet of the page size. Only a missing page is an
    /// error.
    pub fn render_page(
        &mut self,
        document: &Document,
        page_index: usize,
        surface: &mut dyn Surface,
        scale: Option<f64>,
    ) -> Result<(), PreviewError> {
        let page = document
            .page(page_index)
            .ok_or(PreviewError::PageNotFound(page_index))?;
        let scale = scale.unwrap_or(DEFAULT_SCALE);

        if let (Some(ref_id), Some(ref_index)) = (page.ref_file_id.as_deref(), page.ref_page_index) {
            match usize::try_from(ref_index) {
                Ok(ref_index) => {
                    if let Some(session) = self.session(document, ref_id) {
                        match session.render_page(ref_index, surface, scale) {
                            Ok(()) => return Ok(()),
                            Err(e) => warn!(page = page_index, ref_id, error = %e, "Preview fell back to a blank page"),
                        }
                    }
                }
                Err(_) => warn!(page = page_index, index = ref_index, "Negative reference page index"),
            }
        }

        paint_blank(document, page, surface, scale);
        Ok(())
    }

    fn session(&mut self, document: &Document, ref_id: &str) -> Option<&mut Box<dyn RenderSession>> {
        if !self.sessions.contains_key(ref_id) {
            let slot = match self.open(document, ref_id) {
                Ok(session) => {
                    debug!(ref_id, pages = session.page_count(), "Opened render session");
                    Slot::Open(session)
                }
                Err(e) => {
                    warn!(ref_id, error = %e, "Failed to open file reference for preview");
                    Slot::Failed
                }
            };
            self.sessions.insert(ref_id.to_string(), slot);
        }
        match self.sessions.get_mut(ref_id) {
            Some(Slot::Open(session)) => Some(session),
            _ => None,
        }
    }

    fn open(&self, document: &Document, ref_id: &str) -> Result<Box<dyn RenderSession>, PreviewError> {
        let failed = |reason: String| PreviewError::OpenFailed {
            ref_id: ref_id.to_string(),
            reason,
        };
        let reference = document
            .file_reference(ref_id)
            .ok_or_else(|| failed("unknown reference".to_string()))?;
        let bytes = reference.src.decode()?;
        self.engine.open(&bytes).map_err(|e| failed(e.to_string()))
    }

    /// Close every session and forget failed references
    pub fn destroy(&mut self) {
        let count = self.session_count();
        for (_, slot) in self.sessions.drain() {
            if let Slot::Open(mut session) = slot {
                session.close();
            }
        }
        if count > 0 {
            debug!(sessions = count, "Closed render sessions");
        }
    }
}

impl<E: RenderEngine> Drop for RenderCache<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn paint_blank(document: &Document, page: &Page, surface: &mut dyn Surface, scale: f64) {
    let size = page
        .page_size
        .or(document.default_page_size)
        .unwrap_or(page_sizes::A4);
    surface.resize(size.scaled(scale));
    surface.fill(Rgb::WHITE);
}
