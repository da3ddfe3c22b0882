//! Publish trailer use case

use thiserror::Error;

use crate::domain::feed::{FeedEntry, PublishName};
use crate::domain::paper::{Doi, PaperMetadata};

use super::ports::{FeedError, FeedStore, MetadataError, MetadataProvider};

/// Errors from the publish use case
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Nothing to publish: the recording is empty")]
    EmptyVideo,

    #[error("Publishing failed: {0}")]
    Feed(#[from] FeedError),
}

/// Input for publishing
#[derive(Debug, Clone)]
pub struct PublishInput {
    /// Account the trailer is filed under
    pub user: String,
    /// Encoded video
    pub video: Vec<u8>,
    /// Paper the trailer presents, if any
    pub doi: Option<Doi>,
}

/// Output from publishing
#[derive(Debug, Clone)]
pub struct PublishOutput {
    pub entry: FeedEntry,
    /// Metadata used to build the name
    pub paper: Option<PaperMetadata>,
    /// Why the lookup yielded nothing, if it was attempted and failed
    pub lookup_error: Option<MetadataError>,
}

/// Use case for filing a recorded trailer into the shared feed.
///
/// A failed DOI lookup does not block publishing; the trailer is filed
/// under placeholder journal and title names instead.
pub struct PublishTrailerUseCase<F, M>
where
    F: FeedStore,
    M: MetadataProvider,
{
    feed: F,
    metadata: M,
}

impl<F, M> PublishTrailerUseCase<F, M>
where
    F: FeedStore,
    M: MetadataProvider,
{
    pub fn new(feed: F, metadata: M) -> Self {
        Self { feed, metadata }
    }

    pub async fn execute(&self, input: PublishInput) -> Result<PublishOutput, PublishError> {
        if input.video.is_empty() {
            return Err(PublishError::EmptyVideo);
        }

        let (paper, lookup_error) = match &input.doi {
            Some(doi) => match self.metadata.lookup(doi).await {
                Ok(paper) => (Some(paper), None),
                Err(e) => {
                    tracing::warn!(doi = %doi, error = %e, "publishing without paper metadata");
                    (None, Some(e))
                }
            },
            None => (None, None),
        };

        let name = PublishName::build(&input.user, paper.as_ref());
        tracing::info!(name = %name, bytes = input.video.len(), "publishing trailer");
        let entry = self.feed.publish(&name, &input.video).await?;

        Ok(PublishOutput {
            entry,
            paper,
            lookup_error,
        })
    }
}
