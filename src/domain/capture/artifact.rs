//! Output artifact value object

use std::fmt;

/// Default filename offered for a finished recording
pub const DEFAULT_OUTPUT_NAME: &str = "research_trailer.webm";

/// Supported video container types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoMimeType {
    #[default]
    Webm,
}

impl VideoMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Webm => "video/webm",
        }
    }
}

impl fmt::Display for VideoMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assembled recording plus the filename suggested for it
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    data: Vec<u8>,
    mime_type: VideoMimeType,
    file_name: String,
}

impl OutputArtifact {
    /// Concatenate chunks in order into one artifact
    pub fn assemble(
        chunks: &[Vec<u8>],
        mime_type: VideoMimeType,
        file_name: impl Into<String>,
    ) -> Self {
        let total: usize = chunks.iter().map(Vec::len).sum();
        let mut data = Vec::with_capacity(total);
        for chunk in chunks {
            data.extend_from_slice(chunk);
        }

        Self {
            data,
            mime_type,
            file_name: file_name.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> VideoMimeType {
        self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        human_readable_size(self.size_bytes())
    }
}

/// Format a byte count as B / KB / MB
pub fn human_readable_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
