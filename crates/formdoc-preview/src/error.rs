use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Page {0} does not exist")]
    PageNotFound(usize),

    #[error("Failed to open file reference '{ref_id}': {reason}")]
    OpenFailed { ref_id: String, reason: String },

    #[error("Page index {index} is out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Model(#[from] formdoc_model::ModelError),
}

impl From<lopdf::Error> for PreviewError {
    fn from(e: lopdf::Error) -> Self {
        PreviewError::Render(e.to_string())
    }
}
