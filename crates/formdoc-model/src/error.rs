use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("File reference id already in use: {0}")]
    FileReferenceIdInUse(String),

    #[error("File reference not found: {0}")]
    FileReferenceNotFound(String),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
