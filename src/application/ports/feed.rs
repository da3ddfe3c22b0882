//! Feed storage port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::feed::{FeedEntry, PublishName};

/// Feed storage errors
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("Failed to access feed storage: {0}")]
    StorageUnavailable(String),

    #[error("Failed to store trailer: {0}")]
    WriteFailed(String),
}

/// Port for the shared trailer feed
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Store a trailer under `name`, replacing any file with that name
    async fn publish(&self, name: &PublishName, video: &[u8]) -> Result<FeedEntry, FeedError>;

    /// Every stored video, sorted by filename
    async fn list(&self) -> Result<Vec<FeedEntry>, FeedError>;

    /// Stored files whose name starts with `user` (spaces ignored)
    async fn list_for_user(&self, user: &str) -> Result<Vec<FeedEntry>, FeedError>;
}
