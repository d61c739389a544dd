//! PDF generation for formdoc documents
//!
//! Turns a [`formdoc_model::Document`] into PDF bytes with `lopdf`: blank or
//! transcluded pages, drawn elements, and an AcroForm holding the fields.
//! Generation is one pass and all-or-nothing; the first error aborts it.
//!
//! ```no_run
//! use formdoc_model::{page_sizes, Document, Page};
//! use formdoc_pdf::{GenerateOptions, GeneratePdf};
//!
//! let mut document = Document::new();
//! document.add_page(Page::new(page_sizes::A4));
//! let bytes = document.generate_pdf_file(&GenerateOptions::new()).unwrap();
//! assert!(bytes.starts_with(b"%PDF"));
//! ```

pub mod appearance;
pub mod canvas;
pub mod config;
pub mod error;
pub mod fonts;
pub mod form;
pub mod format;
pub mod generator;
pub mod images;
pub mod import;
pub mod layout;
mod stream;
pub mod transclude;

pub use config::{FontSource, GenerateOptions, GeneratorConfig};
pub use error::GenerateError;
pub use format::{format_date, format_number};
pub use generator::{PdfFileGenerator, DEFAULT_FONT_SIZE};
pub use import::import_source;

use formdoc_model::Document;

/// Generate a PDF file from `document`
pub fn generate_pdf_file(document: &Document, options: &GenerateOptions) -> Result<Vec<u8>, GenerateError> {
    PdfFileGenerator::new(document, options).generate()
}

/// PDF generation as a method on documents
pub trait GeneratePdf {
    fn generate_pdf_file(&self, options: &GenerateOptions) -> Result<Vec<u8>, GenerateError>;
}

impl GeneratePdf for Document {
    fn generate_pdf_file(&self, options: &GenerateOptions) -> Result<Vec<u8>, GenerateError> {
        generate_pdf_file(self, options)
    }
}
