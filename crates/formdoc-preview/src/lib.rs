//! Page previews for formdoc documents
//!
//! [`RenderCache`] opens each referenced source document once through a
//! [`RenderEngine`] and reuses the session for every page transcluded from
//! it. Pages without a source, or whose source cannot be rendered, preview
//! as blank sheets.

pub mod cache;
pub mod engine;
pub mod error;
pub mod lopdf_engine;

pub use cache::RenderCache;
pub use engine::{RenderEngine, RenderSession, Surface};
pub use error::PreviewError;
pub use lopdf_engine::LopdfEngine;
