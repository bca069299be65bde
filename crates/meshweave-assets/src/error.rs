use thiserror::Error;

/// Errors that can occur while parsing or assembling a model.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to retrieve '{0}': {1}")]
    Retrieval(String, String),

    #[error("invalid face index '{token}' on line {line}")]
    InvalidFaceIndex { token: String, line: usize },

    #[error("face index {index} resolves out of range (table length {len}) on line {line}")]
    FaceIndexOutOfRange { index: i64, len: usize, line: usize },

    #[error("vertex slot {slot} carries no color data (line {line})")]
    MissingVertexColor { slot: usize, line: usize },

    #[error("failed to load image '{0}': {1}")]
    ImageLoad(String, String),

    #[error("texture failed to load: {0}")]
    TextureFailed(String),

    #[error("texture source dropped before completion")]
    TextureAbandoned,

    #[error("background task failed: {0}")]
    TaskFailed(String),
}
