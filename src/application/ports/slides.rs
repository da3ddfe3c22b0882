//! Slide rendering port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::slides::SlideDeck;

/// Slide rendering errors
#[derive(Debug, Clone, Error)]
pub enum SlideError {
    #[error("pdftoppm not found. Please install poppler-utils.")]
    RendererNotFound,

    #[error("Input is not a PDF document")]
    InvalidPdf,

    #[error("Failed to render slides: {0}")]
    RenderFailed(String),

    #[error("Failed to read rendered slide: {0}")]
    ReadFailed(String),
}

/// Port for PDF rasterization
#[async_trait]
pub trait SlideRenderer: Send + Sync {
    /// Render every page of `pdf` at `scale` times its natural size
    async fn render(&self, pdf: &[u8], scale: f32) -> Result<SlideDeck, SlideError>;
}
