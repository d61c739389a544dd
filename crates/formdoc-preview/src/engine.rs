//! The seam between the render cache and a rasterizer

use formdoc_model::{Rgb, Size};

use crate::error::PreviewError;

/// Drawable target supplied by the host
pub trait Surface {
    /// Set the pixel dimensions of the surface
    fn resize(&mut self, size: Size);

    fn fill(&mut self, color: Rgb);
}

/// One opened source document
pub trait RenderSession {
    fn page_count(&self) -> usize;

    fn page_size(&self, index: usize) -> Result<Size, PreviewError>;

    /// Paint page `index` onto `surface`, sizing the surface to the page
    /// multiplied by `scale`
    fn render_page(&mut self, index: usize, surface: &mut dyn Surface, scale: f64) -> Result<(), PreviewError>;

    /// Release engine resources. Called once, before the session is dropped.
    fn close(&mut self);
}

pub trait RenderEngine {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn RenderSession>, PreviewError>;
}
