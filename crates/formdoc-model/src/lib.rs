//! Formdoc Model - declarative fillable-document model
//!
//! A [`Document`] is an ordered list of [`Page`]s, each holding
//! [`Element`]s (text, images, shapes and form fields), plus a table of
//! external source files pages can be transcluded from. The whole tree is
//! plain serde data and round-trips through JSON.

pub mod color;
pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod numfmt;
pub mod page;
pub mod source;
pub mod value;

pub use color::{Hsv, Rgb};
pub use document::{Document, FileReference};
pub use element::{Element, ElementBase, ElementType, FieldBase, FieldStyle};
pub use error::ModelError;
pub use geometry::{page_sizes, Point, Size};
pub use page::Page;
pub use source::BinarySource;
