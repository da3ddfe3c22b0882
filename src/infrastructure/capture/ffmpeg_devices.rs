//! FFmpeg-probed capture device adapter

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{CaptureDevices, CaptureError};
use crate::domain::capture::{MediaStream, MediaTrack, TrackHandle, TrackKind, TrackSource};

use super::platform::{classify_failure, display_input, microphone_input, InputSpec};

/// Seconds of input read by an access probe
const PROBE_SECONDS: &str = "0.1";

/// Claim on a capture device.
///
/// The device is opened by the recorder; stopping the handle withdraws
/// the claim so the recorder refuses it.
#[derive(Debug)]
pub struct DeviceHandle {
    live: AtomicBool,
}

impl DeviceHandle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            live: AtomicBool::new(true),
        })
    }
}

impl TrackHandle for DeviceHandle {
    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            tracing::debug!("capture device released");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Grants screen and microphone access after ffmpeg proves it can open them
pub struct FfmpegCaptureDevices {
    binary: String,
}

impl FfmpegCaptureDevices {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    /// Use a specific ffmpeg executable
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Read a fraction of a second from `input` and discard it.
    ///
    /// Killed if the caller gives up waiting (e.g. on a pending OS prompt).
    async fn probe(&self, input: &InputSpec) -> Result<(), CaptureError> {
        let output = Command::new(&self.binary)
            .args(["-hide_banner", "-nostdin", "-loglevel", "error"])
            .args(input.to_args())
            .args(["-t", PROBE_SECONDS, "-f", "null", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptureError::PlatformUnavailable(format!(
                        "{} not found. Please install ffmpeg.",
                        self.binary
                    ))
                } else {
                    CaptureError::PlatformUnavailable(e.to_string())
                }
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
        }
    }
}

impl Default for FfmpegCaptureDevices {
    fn default() -> Self {
        Self::new()
    }
}

fn track(id: &str, kind: TrackKind, source: TrackSource) -> MediaTrack {
    MediaTrack::new(id, kind, source, DeviceHandle::new())
}

#[async_trait]
impl CaptureDevices for FfmpegCaptureDevices {
    async fn request_display(&self) -> Result<MediaStream, CaptureError> {
        let input = display_input()?;
        tracing::debug!(format = input.format, device = %input.device, "probing display");
        self.probe(&input).await?;

        // System sound comes along with the screen, as a browser share does
        Ok(MediaStream::new(vec![
            track("display-video", TrackKind::Video, TrackSource::Display),
            track("display-audio", TrackKind::Audio, TrackSource::Display),
        ]))
    }

    async fn request_microphone(&self) -> Result<MediaStream, CaptureError> {
        let input = microphone_input()?;
        tracing::debug!(format = input.format, device = %input.device, "probing microphone");
        self.probe(&input).await?;

        Ok(MediaStream::new(vec![track(
            "microphone-audio",
            TrackKind::Audio,
            TrackSource::Microphone,
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_stop_is_idempotent() {
        let handle = DeviceHandle::new();
        assert!(handle.is_live());
        handle.stop();
        handle.stop();
        assert!(!handle.is_live());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn missing_ffmpeg_is_platform_unavailable() {
        let devices = FfmpegCaptureDevices::with_binary("jclub-test-no-such-ffmpeg");
        let err = devices.request_microphone().await.unwrap_err();
        assert!(matches!(err, CaptureError::PlatformUnavailable(ref m) if m.contains("not found")));
    }
}
