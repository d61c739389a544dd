use thiserror::Error;

/// Fatal generation errors. Any of these aborts the whole run; no partial
/// output is produced.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Unsupported image mime type: {0}")]
    UnsupportedMimeType(String),

    #[error("Image source is empty")]
    EmptyImageSource,

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Reference page index is missing on page {page}")]
    MissingReferencePageIndex { page: usize },

    #[error("Reference page index must be greater or equal to zero (page {page}, index {index})")]
    NegativeReferencePageIndex { page: usize, index: i64 },

    #[error("File reference '{ref_id}' used by page {page} is not found")]
    FileReferenceNotFound { page: usize, ref_id: String },

    #[error("Page index {index} is out of range for file reference '{ref_id}' ({count} pages)")]
    ReferencePageOutOfRange {
        ref_id: String,
        index: usize,
        count: usize,
    },

    #[error("Failed to load file reference '{ref_id}': {reason}")]
    InvalidSource { ref_id: String, reason: String },

    #[error("A field named '{0}' already exists")]
    DuplicateFieldName(String),

    #[error("Field name must not be empty")]
    EmptyFieldName,

    #[error("Malformed field name '{0}': periods must be separated by at least one character")]
    MalformedFieldName(String),

    #[error(transparent)]
    Model(#[from] formdoc_model::ModelError),

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF operation failed: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for GenerateError {
    fn from(e: lopdf::Error) -> Self {
        GenerateError::Pdf(e.to_string())
    }
}
