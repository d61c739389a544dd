//! Building documents from existing PDF files

use formdoc_model::{page_sizes, BinarySource, Document, Page, Size};

use crate::error::GenerateError;
use crate::transclude::{box_size, inherited_attribute};

/// Register `bytes` as a file reference of `document` and append one
/// transcluded page per source page, sized like the source page.
///
/// Returns the indices of the appended pages.
pub fn import_source(document: &mut Document, bytes: Vec<u8>) -> Result<Vec<usize>, GenerateError> {
    let source = lopdf::Document::load_mem(&bytes)?;
    let sizes: Vec<Size> = source
        .get_pages()
        .into_values()
        .map(|page_id| {
            inherited_attribute(&source, page_id, b"MediaBox")
                .and_then(|mb| mb.as_array().ok().and_then(|arr| box_size(arr)))
                .unwrap_or(page_sizes::A4)
        })
        .collect();

    let ref_id = document.add_file_reference(BinarySource::Bytes(bytes), None)?;
    let first = document.page_count();
    for (index, size) in sizes.iter().enumerate() {
        document.add_page(Page::transcluded(ref_id.clone(), index, *size));
    }
    tracing::info!(ref_id = %ref_id, pages = sizes.len(), "Imported source document");
    Ok((first..document.page_count()).collect())
}
