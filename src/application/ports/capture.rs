//! Capture platform port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::capture::{CompositeStream, MediaStream};

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture unavailable on this platform: {0}")]
    PlatformUnavailable(String),

    #[error("Permission request timed out after {0}")]
    Timeout(String),

    #[error("Failed to start recorder: {0}")]
    RecorderStartFailed(String),

    #[error("Recorder failed: {0}")]
    RecorderFailed(String),
}

impl CaptureError {
    /// Errors raised while acquiring devices
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::PlatformUnavailable(_) | Self::Timeout(_)
        )
    }
}

/// Events produced by a running recorder, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A block of encoded media. May be empty.
    DataAvailable(Vec<u8>),
    /// Recorder finished after a stop request; no data follows
    Finalized,
    /// Recorder died
    Failed(String),
}

/// Receiving side of a recorder's event stream
pub type RecorderEvents = mpsc::UnboundedReceiver<RecorderEvent>;

/// Port for acquiring capture devices
#[async_trait]
pub trait CaptureDevices: Send + Sync {
    /// Request screen capture (video plus system audio)
    async fn request_display(&self) -> Result<MediaStream, CaptureError>;

    /// Request microphone capture (audio only)
    async fn request_microphone(&self) -> Result<MediaStream, CaptureError>;
}

/// Port for encoding a composite stream
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    /// Begin recording.
    ///
    /// # Returns
    /// The event stream for this recording
    async fn start(&self, stream: &CompositeStream) -> Result<RecorderEvents, CaptureError>;

    /// Ask the recorder to flush and emit `Finalized`
    async fn stop(&self) -> Result<(), CaptureError>;
}
