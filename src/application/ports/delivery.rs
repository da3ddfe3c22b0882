//! Artifact delivery port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::OutputArtifact;

/// Delivery errors
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("Output directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Failed to save recording: {0}")]
    WriteFailed(String),
}

/// Port for handing the finished recording to the user
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Save the artifact under its suggested name (or a free variant of it).
    ///
    /// # Returns
    /// Where the file ended up
    async fn deliver(&self, artifact: &OutputArtifact) -> Result<PathBuf, DeliveryError>;
}
