//! Capture session state machine

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use super::artifact::{OutputArtifact, VideoMimeType};
use super::track::{CompositeStream, MediaStream, MediaTrack};

/// Capture session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Requesting,
    Recording,
    Stopping,
    Assembling,
    Done,
    Error,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Done and Error end a session
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// States in which the session holds, or is acquiring, devices
    pub const fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Requesting | Self::Recording | Self::Stopping | Self::Assembling
        )
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Outcome of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    /// First stop: the recorder must be asked to finalize
    Issued,
    /// Stop was already requested; nothing to do
    AlreadyStopping,
}

/// One recording attempt.
///
/// State machine:
///   IDLE -> REQUESTING (begin_request)
///   REQUESTING -> RECORDING (attach_streams, begin_recording)
///   RECORDING -> STOPPING (request_stop)
///   STOPPING -> ASSEMBLING (assemble)
///   ASSEMBLING -> DONE (complete)
///   REQUESTING | RECORDING | STOPPING -> ERROR (fail)
///
/// Chunks are appended in arrival order while recording, and while
/// stopping until the recorder finalizes. Every terminal transition
/// releases all tracks and clears the chunk buffer.
#[derive(Debug)]
pub struct CaptureSession {
    id: Uuid,
    state: CaptureState,
    video_tracks: Vec<MediaTrack>,
    audio_tracks: Vec<MediaTrack>,
    chunks: Vec<Vec<u8>>,
}

impl CaptureSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: CaptureState::Idle,
            video_tracks: Vec::new(),
            audio_tracks: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn video_tracks(&self) -> &[MediaTrack] {
        &self.video_tracks
    }

    pub fn audio_tracks(&self) -> &[MediaTrack] {
        &self.audio_tracks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bytes accumulated so far
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Number of held tracks whose device is still live
    pub fn live_track_count(&self) -> usize {
        self.video_tracks
            .iter()
            .chain(self.audio_tracks.iter())
            .filter(|t| t.is_live())
            .count()
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }

    /// Transition from IDLE to REQUESTING
    pub fn begin_request(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Idle {
            return Err(self.invalid("request capture"));
        }
        self.state = CaptureState::Requesting;
        Ok(())
    }

    /// Build the composite stream from both granted streams.
    ///
    /// Keeps every video track of the display stream and every audio track
    /// of the microphone stream. Everything else (system sound, any
    /// microphone video) is stopped right away. The state stays REQUESTING
    /// until the recorder has started.
    pub fn attach_streams(
        &mut self,
        display: MediaStream,
        microphone: MediaStream,
    ) -> Result<CompositeStream, InvalidStateTransition> {
        if self.state != CaptureState::Requesting {
            display.release();
            microphone.release();
            return Err(self.invalid("attach streams"));
        }

        for track in display.audio_tracks().chain(microphone.video_tracks()) {
            track.stop();
        }

        self.video_tracks = display.video_tracks().cloned().collect();
        self.audio_tracks = microphone.audio_tracks().cloned().collect();

        Ok(CompositeStream::new(
            self.video_tracks.clone(),
            self.audio_tracks.clone(),
        ))
    }

    /// Transition from REQUESTING to RECORDING
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Requesting {
            return Err(self.invalid("begin recording"));
        }
        self.chunks.clear();
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Append one data block. Empty blocks are ignored.
    ///
    /// Returns whether the block was retained.
    pub fn push_chunk(&mut self, data: Vec<u8>) -> Result<bool, InvalidStateTransition> {
        if !matches!(self.state, CaptureState::Recording | CaptureState::Stopping) {
            return Err(self.invalid("accept recorded data"));
        }
        if data.is_empty() {
            return Ok(false);
        }
        self.chunks.push(data);
        Ok(true)
    }

    /// Transition from RECORDING to STOPPING.
    ///
    /// Repeated stops after the first are no-ops. Stopping a session that
    /// never started recording is a misuse error.
    pub fn request_stop(&mut self) -> Result<StopRequest, InvalidStateTransition> {
        match self.state {
            CaptureState::Recording => {
                self.state = CaptureState::Stopping;
                Ok(StopRequest::Issued)
            }
            CaptureState::Stopping | CaptureState::Assembling | CaptureState::Done => {
                Ok(StopRequest::AlreadyStopping)
            }
            CaptureState::Idle | CaptureState::Requesting | CaptureState::Error => {
                Err(self.invalid("stop recording"))
            }
        }
    }

    /// Transition from STOPPING to ASSEMBLING on the recorder's finalize event
    pub fn assemble(
        &mut self,
        mime_type: VideoMimeType,
        file_name: &str,
    ) -> Result<OutputArtifact, InvalidStateTransition> {
        if self.state != CaptureState::Stopping {
            return Err(self.invalid("assemble recording"));
        }
        self.state = CaptureState::Assembling;
        Ok(OutputArtifact::assemble(&self.chunks, mime_type, file_name))
    }

    /// Transition from ASSEMBLING to DONE
    pub fn complete(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Assembling {
            return Err(self.invalid("complete recording"));
        }
        self.release();
        self.state = CaptureState::Done;
        Ok(())
    }

    /// Move to ERROR from any non-terminal state, releasing everything.
    ///
    /// Failing a terminal session only re-runs the release.
    pub fn fail(&mut self) {
        self.release();
        if !self.state.is_terminal() {
            self.state = CaptureState::Error;
        }
    }

    fn release(&mut self) {
        for track in self.video_tracks.drain(..).chain(self.audio_tracks.drain(..)) {
            track.stop();
        }
        self.chunks.clear();
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::super::track::testing::{display_stream, microphone_stream};
    use super::*;

    fn recording_session() -> (CaptureSession, MediaStream, MediaStream) {
        let display = display_stream();
        let mic = microphone_stream();
        let mut session = CaptureSession::new();
        session.begin_request().unwrap();
        session
            .attach_streams(display.clone(), mic.clone())
            .unwrap();
        session.begin_recording().unwrap();
        (session, display, mic)
    }

    #[test]
    fn new_session_is_idle() {
        let session = CaptureSession::new();
        assert_eq!(session.state(), CaptureState::Idle);
        assert_eq!(session.live_track_count(), 0);
        assert_eq!(session.chunk_count(), 0);
    }

    #[test]
    fn composite_keeps_display_video_and_mic_audio() {
        let display = display_stream();
        let mut session = CaptureSession::new();
        session.begin_request().unwrap();

        let composite = session
            .attach_streams(display.clone(), microphone_stream())
            .unwrap();

        let ids: Vec<&str> = composite.tracks().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["screen-video", "mic-audio"]);
        assert_eq!(session.video_tracks().len(), 1);
        assert_eq!(session.audio_tracks().len(), 1);
    }

    #[test]
    fn discarded_system_audio_is_released() {
        let display = display_stream();
        let mut session = CaptureSession::new();
        session.begin_request().unwrap();
        session
            .attach_streams(display.clone(), microphone_stream())
            .unwrap();

        let system_audio = display.audio_tracks().next().unwrap();
        assert!(!system_audio.is_live());
        assert_eq!(session.live_track_count(), 2);
    }

    #[test]
    fn attach_outside_requesting_releases_streams() {
        let display = display_stream();
        let mic = microphone_stream();
        let mut session = CaptureSession::new();

        let err = session
            .attach_streams(display.clone(), mic.clone())
            .unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
        assert!(display.tracks().iter().all(|t| !t.is_live()));
        assert!(mic.tracks().iter().all(|t| !t.is_live()));
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let (mut session, _, _) = recording_session();
        assert!(session.push_chunk(vec![1; 10]).unwrap());
        assert!(!session.push_chunk(Vec::new()).unwrap());
        assert!(session.push_chunk(vec![2; 20]).unwrap());
        assert_eq!(session.chunk_count(), 2);
        assert_eq!(session.buffered_bytes(), 30);
    }

    #[test]
    fn push_chunk_before_recording_fails() {
        let mut session = CaptureSession::new();
        let err = session.push_chunk(vec![1]).unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
    }

    #[test]
    fn trailing_data_accepted_while_stopping() {
        let (mut session, _, _) = recording_session();
        session.push_chunk(vec![1, 2]).unwrap();
        session.request_stop().unwrap();
        session.push_chunk(vec![3]).unwrap();

        let artifact = session.assemble(VideoMimeType::Webm, "x.webm").unwrap();
        assert_eq!(artifact.data(), &[1, 2, 3]);
    }

    #[test]
    fn no_data_after_assembly() {
        let (mut session, _, _) = recording_session();
        session.request_stop().unwrap();
        session.assemble(VideoMimeType::Webm, "x.webm").unwrap();
        assert!(session.push_chunk(vec![9]).is_err());
    }

    #[test]
    fn repeated_stop_is_noop() {
        let (mut session, _, _) = recording_session();
        assert_eq!(session.request_stop().unwrap(), StopRequest::Issued);
        assert_eq!(session.request_stop().unwrap(), StopRequest::AlreadyStopping);
        assert_eq!(session.state(), CaptureState::Stopping);
    }

    #[test]
    fn stop_from_idle_is_misuse() {
        let mut session = CaptureSession::new();
        let err = session.request_stop().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
        assert!(err.action.contains("stop recording"));
    }

    #[test]
    fn stop_while_requesting_is_misuse() {
        let mut session = CaptureSession::new();
        session.begin_request().unwrap();
        assert!(session.request_stop().is_err());
    }

    #[test]
    fn full_cycle_releases_everything() {
        let (mut session, display, mic) = recording_session();
        session.push_chunk(vec![0; 10]).unwrap();
        session.push_chunk(Vec::new()).unwrap();
        session.push_chunk(vec![1; 20]).unwrap();
        session.request_stop().unwrap();

        let artifact = session.assemble(VideoMimeType::Webm, "research_trailer.webm").unwrap();
        assert_eq!(artifact.size_bytes(), 30);
        assert_eq!(&artifact.data()[..10], &[0; 10]);
        assert_eq!(&artifact.data()[10..], &[1; 20]);
        assert_eq!(session.state(), CaptureState::Assembling);

        session.complete().unwrap();
        assert_eq!(session.state(), CaptureState::Done);
        assert_eq!(session.live_track_count(), 0);
        assert_eq!(session.chunk_count(), 0);
        assert!(display.tracks().iter().all(|t| !t.is_live()));
        assert!(mic.tracks().iter().all(|t| !t.is_live()));
    }

    #[test]
    fn zero_data_yields_empty_artifact() {
        let (mut session, _, _) = recording_session();
        session.request_stop().unwrap();
        let artifact = session.assemble(VideoMimeType::Webm, "x.webm").unwrap();
        assert!(artifact.is_empty());
        session.complete().unwrap();
    }

    #[test]
    fn fail_releases_tracks() {
        let (mut session, display, mic) = recording_session();
        session.push_chunk(vec![1]).unwrap();
        session.fail();
        assert_eq!(session.state(), CaptureState::Error);
        assert_eq!(session.live_track_count(), 0);
        assert_eq!(session.chunk_count(), 0);
        assert!(display.tracks().iter().chain(mic.tracks()).all(|t| !t.is_live()));
    }

    #[test]
    fn fail_keeps_done_terminal() {
        let (mut session, _, _) = recording_session();
        session.request_stop().unwrap();
        session.assemble(VideoMimeType::Webm, "x.webm").unwrap();
        session.complete().unwrap();
        session.fail();
        assert_eq!(session.state(), CaptureState::Done);
    }

    #[test]
    fn begin_request_only_from_idle() {
        let (mut session, _, _) = recording_session();
        let err = session.begin_request().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Recording);
    }

    #[test]
    fn dropping_session_releases_tracks() {
        let (session, display, _) = recording_session();
        drop(session);
        assert!(display.tracks().iter().all(|t| !t.is_live()));
    }

    #[test]
    fn state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "idle");
        assert_eq!(CaptureState::Assembling.to_string(), "assembling");
        assert!(CaptureState::Done.is_terminal());
        assert!(CaptureState::Recording.is_active());
        assert!(!CaptureState::Error.is_active());
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: CaptureState::Idle,
            action: "stop recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("stop recording"));
        assert!(msg.contains("idle"));
    }
}
