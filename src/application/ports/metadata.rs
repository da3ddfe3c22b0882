//! Paper metadata port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::paper::{Doi, PaperMetadata};

/// Metadata lookup errors
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("DOI not found")]
    NotFound,

    #[error("Metadata request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse metadata response: {0}")]
    ParseError(String),

    #[error("Metadata API error: {0}")]
    ApiError(String),
}

/// Port for DOI metadata lookup
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up a paper by DOI. Single attempt, no retry.
    async fn lookup(&self, doi: &Doi) -> Result<PaperMetadata, MetadataError>;
}
