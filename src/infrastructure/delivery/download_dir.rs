//! Download directory sink adapter

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{ArtifactSink, DeliveryError};
use crate::domain::capture::OutputArtifact;

/// Give up after this many `name (n).ext` candidates
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Saves recordings the way a browser download would
pub struct DownloadDirSink {
    dir: PathBuf,
}

impl DownloadDirSink {
    /// The platform download directory, or the working directory
    pub fn new() -> Self {
        let dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_dir(dir)
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `name.ext` for attempt 0, then `name (1).ext`, `name (2).ext`, ...
    fn candidate_name(file_name: &str, attempt: u32) -> String {
        if attempt == 0 {
            return file_name.to_string();
        }
        match file_name.rfind('.') {
            Some(dot) if dot > 0 => format!(
                "{} ({}){}",
                &file_name[..dot],
                attempt,
                &file_name[dot..]
            ),
            _ => format!("{} ({})", file_name, attempt),
        }
    }
}

impl Default for DownloadDirSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactSink for DownloadDirSink {
    async fn deliver(&self, artifact: &OutputArtifact) -> Result<PathBuf, DeliveryError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DeliveryError::DirectoryUnavailable(format!("{}: {}", self.dir.display(), e)))?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(Self::candidate_name(artifact.file_name(), attempt));

            // create_new keeps an existing download untouched
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(DeliveryError::WriteFailed(format!("{}: {}", path.display(), e)))
                }
            };

            file.write_all(artifact.data())
                .await
                .map_err(|e| DeliveryError::WriteFailed(e.to_string()))?;
            file.flush()
                .await
                .map_err(|e| DeliveryError::WriteFailed(e.to_string()))?;

            tracing::info!(
                path = %path.display(),
                mime = artifact.mime_type().as_str(),
                bytes = artifact.size_bytes(),
                "recording saved"
            );
            return Ok(path);
        }

        Err(DeliveryError::WriteFailed(format!(
            "no free file name for {} in {}",
            artifact.file_name(),
            self.dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::VideoMimeType;
    use tempfile::TempDir;

    fn artifact(data: &[u8]) -> OutputArtifact {
        OutputArtifact::assemble(&[data.to_vec()], VideoMimeType::Webm, "research_trailer.webm")
    }

    #[test]
    fn candidate_names() {
        assert_eq!(
            DownloadDirSink::candidate_name("research_trailer.webm", 0),
            "research_trailer.webm"
        );
        assert_eq!(
            DownloadDirSink::candidate_name("research_trailer.webm", 2),
            "research_trailer (2).webm"
        );
        assert_eq!(DownloadDirSink::candidate_name("clip", 1), "clip (1)");
        assert_eq!(DownloadDirSink::candidate_name(".webm", 1), ".webm (1)");
    }

    #[tokio::test]
    async fn writes_under_suggested_name() {
        let dir = TempDir::new().unwrap();
        let sink = DownloadDirSink::with_dir(dir.path());

        let path = sink.deliver(&artifact(b"abc")).await.unwrap();

        assert_eq!(path, dir.path().join("research_trailer.webm"));
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn collision_picks_next_free_name() {
        let dir = TempDir::new().unwrap();
        let sink = DownloadDirSink::with_dir(dir.path());

        let first = sink.deliver(&artifact(b"one")).await.unwrap();
        let second = sink.deliver(&artifact(b"two")).await.unwrap();
        let third = sink.deliver(&artifact(b"three")).await.unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(second, dir.path().join("research_trailer (1).webm"));
        assert_eq!(third, dir.path().join("research_trailer (2).webm"));
    }

    #[tokio::test]
    async fn empty_artifact_still_written() {
        let dir = TempDir::new().unwrap();
        let sink = DownloadDirSink::with_dir(dir.path().join("new"));

        let empty = OutputArtifact::assemble(&[], VideoMimeType::Webm, "research_trailer.webm");
        let path = sink.deliver(&empty).await.unwrap();

        assert_eq!(std::fs::metadata(path).unwrap().len(), 0);
    }
}
