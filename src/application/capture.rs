//! Capture session controller use case

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::capture::{
    human_readable_size, CaptureSession, CaptureState, InvalidStateTransition, MediaStream,
    StopRequest, VideoMimeType, DEFAULT_OUTPUT_NAME,
};
use crate::domain::duration::Duration;

use super::ports::{
    ArtifactSink, CaptureDevices, CaptureError, DeliveryError, MediaRecorder, NotificationIcon,
    Notifier, RecorderEvent, RecorderEvents,
};

/// Title used for every capture notification
pub const NOTIFY_TITLE: &str = "J-Club";

/// Shown when recording begins
pub const MSG_RECORDING_STARTED: &str = "Recording started! Present your slides now.";

/// Shown when device access is refused or unavailable
pub const MSG_ACCESS_DENIED: &str = "Recording access denied.";

/// Errors from the capture controller
#[derive(Debug, Error)]
pub enum CaptureControllerError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),
}

/// Capture settings
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// How long both permission prompts may stay unanswered
    pub permission_timeout: Duration,
    /// Filename suggested for the finished recording
    pub output_name: String,
    /// Container tag of the assembled file
    pub mime_type: VideoMimeType,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            permission_timeout: Duration::default_permission_timeout(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            mime_type: VideoMimeType::Webm,
        }
    }
}

/// Result of a delivered recording
#[derive(Debug, Clone)]
pub struct CaptureOutput {
    pub session_id: Uuid,
    /// Where the sink saved the file
    pub path: PathBuf,
    pub size_bytes: usize,
    pub mime_type: VideoMimeType,
}

impl CaptureOutput {
    pub fn human_readable_size(&self) -> String {
        human_readable_size(self.size_bytes)
    }
}

/// What one recorder event did to the session
#[derive(Debug, Clone)]
pub enum CaptureUpdate {
    /// Data arrived (possibly empty); totals so far
    Data { chunks: usize, bytes: usize },
    /// Recorder finalized and the artifact was delivered
    Finished(CaptureOutput),
}

/// Drives one capture session at a time through its lifecycle.
///
/// The session is created on `start` and ends in `Done` or `Error`; a new
/// `start` after either replaces it with a fresh session.
pub struct CaptureController<D, R, S, N>
where
    D: CaptureDevices,
    R: MediaRecorder,
    S: ArtifactSink,
    N: Notifier,
{
    devices: D,
    recorder: R,
    sink: S,
    notifier: N,
    settings: CaptureSettings,
    session: Mutex<Option<CaptureSession>>,
    events: Mutex<Option<RecorderEvents>>,
}

impl<D, R, S, N> CaptureController<D, R, S, N>
where
    D: CaptureDevices,
    R: MediaRecorder,
    S: ArtifactSink,
    N: Notifier,
{
    /// Create a new controller
    pub fn new(devices: D, recorder: R, sink: S, notifier: N, settings: CaptureSettings) -> Self {
        Self {
            devices,
            recorder,
            sink,
            notifier,
            settings,
            session: Mutex::new(None),
            events: Mutex::new(None),
        }
    }

    /// Current state (idle before the first start)
    pub async fn state(&self) -> CaptureState {
        self.session
            .lock()
            .await
            .as_ref()
            .map(CaptureSession::state)
            .unwrap_or_default()
    }

    /// Live tracks held by the current session
    pub async fn live_track_count(&self) -> usize {
        self.session
            .lock()
            .await
            .as_ref()
            .map(CaptureSession::live_track_count)
            .unwrap_or(0)
    }

    /// Start a new session: acquire both streams, compose, start the recorder
    pub async fn start(&self) -> Result<Uuid, CaptureControllerError> {
        let session_id = {
            let mut guard = self.session.lock().await;
            if let Some(current) = guard.as_ref() {
                if current.state().is_active() {
                    return Err(InvalidStateTransition {
                        current_state: current.state(),
                        action: "start recording".to_string(),
                    }
                    .into());
                }
            }

            let mut session = CaptureSession::new();
            session.begin_request()?;
            let id = session.id();
            *guard = Some(session);
            id
        };

        tracing::info!(session = %session_id, "requesting display and microphone");
        let acquired = self.acquire_streams().await;

        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut() else {
            if let Ok((display, microphone)) = &acquired {
                display.release();
                microphone.release();
            }
            return Err(Self::idle_error("start recording").into());
        };

        let (display, microphone) = match acquired {
            Ok(streams) => streams,
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "capture access failed");
                session.fail();
                drop(guard);
                self.notify(MSG_ACCESS_DENIED, NotificationIcon::Error).await;
                return Err(e.into());
            }
        };

        let composite = session.attach_streams(display, microphone)?;
        tracing::debug!(
            session = %session_id,
            video = composite.video_tracks().len(),
            audio = composite.audio_tracks().len(),
            "composite stream ready"
        );

        let events = match self.recorder.start(&composite).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "recorder did not start");
                session.fail();
                drop(guard);
                self.notify(&format!("Recording failed: {}", e), NotificationIcon::Error)
                    .await;
                return Err(e.into());
            }
        };

        session.begin_recording()?;
        *self.events.lock().await = Some(events);
        drop(guard);

        tracing::info!(session = %session_id, "recording");
        self.notify(MSG_RECORDING_STARTED, NotificationIcon::Recording)
            .await;

        Ok(session_id)
    }

    /// Request the recorder to finalize. Repeated calls are no-ops.
    pub async fn stop(&self) -> Result<StopRequest, CaptureControllerError> {
        let mut guard = self.session.lock().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| Self::idle_error("stop recording"))?;

        let request = session.request_stop()?;
        if request == StopRequest::AlreadyStopping {
            tracing::debug!(session = %session.id(), "stop already requested");
            return Ok(request);
        }

        tracing::info!(session = %session.id(), "stopping recorder");
        if let Err(e) = self.recorder.stop().await {
            tracing::warn!(session = %session.id(), error = %e, "recorder stop failed");
            session.fail();
            drop(guard);
            self.notify(&format!("Recording failed: {}", e), NotificationIcon::Error)
                .await;
            return Err(e.into());
        }

        Ok(request)
    }

    /// Wait for the next recorder event and apply it.
    ///
    /// Dropping the future while it waits loses nothing. Once an event
    /// arrives it should be driven to completion, so callers that race it
    /// against other work run it on its own task.
    pub async fn process_next_event(&self) -> Result<CaptureUpdate, CaptureControllerError> {
        let event = {
            let mut events = self.events.lock().await;
            match events.as_mut() {
                Some(rx) => Some(rx.recv().await),
                None => None,
            }
        };
        // Session is read only once the events lock is released
        let Some(event) = event else {
            return Err(InvalidStateTransition {
                current_state: self.state().await,
                action: "wait for recorder events".to_string(),
            }
            .into());
        };

        let mut guard = self.session.lock().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| Self::idle_error("accept recorded data"))?;

        match event {
            Some(RecorderEvent::DataAvailable(data)) => {
                session.push_chunk(data)?;
                Ok(CaptureUpdate::Data {
                    chunks: session.chunk_count(),
                    bytes: session.buffered_bytes(),
                })
            }
            Some(RecorderEvent::Finalized) => {
                // The recorder can end on its own (e.g. the shared screen went away)
                if session.state() == CaptureState::Recording {
                    session.request_stop()?;
                }

                let artifact = session.assemble(self.settings.mime_type, &self.settings.output_name)?;
                *self.events.lock().await = None;
                tracing::info!(
                    session = %session.id(),
                    bytes = artifact.size_bytes(),
                    "recording assembled"
                );

                match self.sink.deliver(&artifact).await {
                    Ok(path) => {
                        session.complete()?;
                        let output = CaptureOutput {
                            session_id: session.id(),
                            path,
                            size_bytes: artifact.size_bytes(),
                            mime_type: artifact.mime_type(),
                        };
                        drop(guard);
                        self.notify(
                            &format!("Trailer saved: {}", output.path.display()),
                            NotificationIcon::Success,
                        )
                        .await;
                        Ok(CaptureUpdate::Finished(output))
                    }
                    Err(e) => {
                        tracing::warn!(session = %session.id(), error = %e, "delivery failed");
                        session.fail();
                        drop(guard);
                        self.notify(&format!("Saving failed: {}", e), NotificationIcon::Error)
                            .await;
                        Err(e.into())
                    }
                }
            }
            Some(RecorderEvent::Failed(message)) => {
                self.abort(guard, message).await
            }
            None => {
                self.abort(guard, "recorder closed without finalizing".to_string())
                    .await
            }
        }
    }

    /// Apply recorder events until the artifact is delivered
    pub async fn finish(&self) -> Result<CaptureOutput, CaptureControllerError> {
        loop {
            if let CaptureUpdate::Finished(output) = self.process_next_event().await? {
                return Ok(output);
            }
        }
    }

    /// Stop and wait for delivery (convenience method)
    pub async fn stop_and_finish(&self) -> Result<CaptureOutput, CaptureControllerError> {
        self.stop().await?;
        self.finish().await
    }

    /// Collect both streams concurrently.
    ///
    /// The first refusal wins; anything already granted is released, and
    /// the pending request is dropped.
    async fn acquire_streams(&self) -> Result<(MediaStream, MediaStream), CaptureError> {
        let display = self.devices.request_display();
        let microphone = self.devices.request_microphone();
        let deadline = tokio::time::sleep(self.settings.permission_timeout.as_std());
        tokio::pin!(display, microphone, deadline);

        let mut granted_display: Option<MediaStream> = None;
        let mut granted_microphone: Option<MediaStream> = None;

        let failure = loop {
            if granted_display.is_some() && granted_microphone.is_some() {
                break None;
            }

            tokio::select! {
                result = &mut display, if granted_display.is_none() => match result {
                    Ok(stream) => granted_display = Some(stream),
                    Err(e) => break Some(e),
                },
                result = &mut microphone, if granted_microphone.is_none() => match result {
                    Ok(stream) => granted_microphone = Some(stream),
                    Err(e) => break Some(e),
                },
                _ = &mut deadline => {
                    break Some(CaptureError::Timeout(self.settings.permission_timeout.to_string()));
                }
            }
        };

        match (failure, granted_display, granted_microphone) {
            (None, Some(display), Some(microphone)) => Ok((display, microphone)),
            (failure, display, microphone) => {
                for stream in display.iter().chain(microphone.iter()) {
                    stream.release();
                }
                Err(failure.unwrap_or_else(|| {
                    CaptureError::PlatformUnavailable("capture request ended early".to_string())
                }))
            }
        }
    }

    async fn abort(
        &self,
        mut guard: tokio::sync::MutexGuard<'_, Option<CaptureSession>>,
        message: String,
    ) -> Result<CaptureUpdate, CaptureControllerError> {
        if let Some(session) = guard.as_mut() {
            tracing::warn!(session = %session.id(), error = %message, "recorder failed");
            session.fail();
        }
        drop(guard);
        *self.events.lock().await = None;
        self.notify(&format!("Recording failed: {}", message), NotificationIcon::Error)
            .await;
        Err(CaptureError::RecorderFailed(message).into())
    }

    async fn notify(&self, message: &str, icon: NotificationIcon) {
        if let Err(e) = self.notifier.notify(NOTIFY_TITLE, message, icon).await {
            tracing::warn!(error = %e, "notification not shown");
        }
    }

    fn idle_error(action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: CaptureState::Idle,
            action: action.to_string(),
        }
    }
}
