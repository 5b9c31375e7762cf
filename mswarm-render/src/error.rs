//! Erros dos sinks de renderização

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GIF encoding error: {0}")]
    Gif(#[from] gif::EncodingError),

    /// Imagem sem pixels
    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: usize, height: usize },
}
