//! Directory-backed feed store adapter

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::{FeedError, FeedStore};
use crate::domain::config::DEFAULT_UPLOADS_DIR;
use crate::domain::feed::{is_video_file, normalize_user, FeedEntry, PublishName};

/// Feed stored as plain files in an uploads directory
pub struct DirectoryFeedStore {
    root: PathBuf,
}

impl DirectoryFeedStore {
    /// Store rooted at `./uploads`
    pub fn new() -> Self {
        Self::with_root(DEFAULT_UPLOADS_DIR)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn ensure_root(&self) -> Result<(), FeedError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| FeedError::StorageUnavailable(format!("{}: {}", self.root.display(), e)))
    }

    /// Plain file names in the root, sorted
    async fn file_names(&self) -> Result<Vec<String>, FeedError> {
        self.ensure_root().await?;

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| FeedError::StorageUnavailable(e.to_string()))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FeedError::StorageUnavailable(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

impl Default for DirectoryFeedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedStore for DirectoryFeedStore {
    async fn publish(&self, name: &PublishName, video: &[u8]) -> Result<FeedEntry, FeedError> {
        self.ensure_root().await?;

        let path = self.root.join(name.as_str());
        fs::write(&path, video)
            .await
            .map_err(|e| FeedError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), "trailer stored");
        Ok(FeedEntry::parse(name.as_str()))
    }

    async fn list(&self) -> Result<Vec<FeedEntry>, FeedError> {
        Ok(self
            .file_names()
            .await?
            .iter()
            .filter(|name| is_video_file(name))
            .map(|name| FeedEntry::parse(name))
            .collect())
    }

    async fn list_for_user(&self, user: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let prefix = normalize_user(user);
        Ok(self
            .file_names()
            .await?
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| FeedEntry::parse(name))
            .collect())
    }
}
