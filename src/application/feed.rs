//! Feed browsing use case

use crate::domain::feed::FeedEntry;

use super::ports::{FeedError, FeedStore};

/// Read side of the shared trailer feed
pub struct BrowseFeedUseCase<F: FeedStore> {
    feed: F,
}

impl<F: FeedStore> BrowseFeedUseCase<F> {
    pub fn new(feed: F) -> Self {
        Self { feed }
    }

    /// Every trailer, for the home feed
    pub async fn home(&self) -> Result<Vec<FeedEntry>, FeedError> {
        let entries = self.feed.list().await?;
        tracing::debug!(count = entries.len(), "home feed loaded");
        Ok(entries)
    }

    /// Trailers filed by `user`, for their profile page
    pub async fn profile(&self, user: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let entries = self.feed.list_for_user(user).await?;
        tracing::debug!(user, count = entries.len(), "profile loaded");
        Ok(entries)
    }
}
