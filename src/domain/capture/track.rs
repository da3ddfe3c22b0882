//! Media track handles and streams

use std::fmt;
use std::sync::Arc;

/// Kind of media a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl TrackKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which capture request produced a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackSource {
    /// Screen capture (video plus system sound)
    Display,
    /// Microphone capture
    Microphone,
}

impl TrackSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Microphone => "microphone",
        }
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform side of a live track.
///
/// `stop` must be idempotent: a released track stays released.
pub trait TrackHandle: Send + Sync {
    /// Release the underlying device
    fn stop(&self);

    /// Whether the device is still held
    fn is_live(&self) -> bool;
}

/// Handle to a live audio or video source owned by a capture session.
///
/// Cloning shares the same platform handle, so stopping any clone
/// releases the device for all of them.
#[derive(Clone)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    source: TrackSource,
    handle: Arc<dyn TrackHandle>,
}

impl MediaTrack {
    pub fn new(
        id: impl Into<String>,
        kind: TrackKind,
        source: TrackSource,
        handle: Arc<dyn TrackHandle>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            source,
            handle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn source(&self) -> TrackSource {
        self.source
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_live()
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("source", &self.source)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Set of tracks returned by one capture request
#[derive(Debug, Clone, Default)]
pub struct MediaStream {
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Audio)
    }

    /// Stop every track in the stream
    pub fn release(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

/// Single stream built from the display video and the microphone audio.
///
/// Video tracks come first, then audio tracks, each in acquisition order.
#[derive(Debug, Clone)]
pub struct CompositeStream {
    video: Vec<MediaTrack>,
    audio: Vec<MediaTrack>,
}

impl CompositeStream {
    pub(crate) fn new(video: Vec<MediaTrack>, audio: Vec<MediaTrack>) -> Self {
        Self { video, audio }
    }

    pub fn video_tracks(&self) -> &[MediaTrack] {
        &self.video
    }

    pub fn audio_tracks(&self) -> &[MediaTrack] {
        &self.audio
    }

    pub fn tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.video.iter().chain(self.audio.iter())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// In-memory track handle for tests
    #[derive(Debug)]
    pub struct FakeHandle {
        live: AtomicBool,
    }

    impl FakeHandle {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                live: AtomicBool::new(true),
            })
        }
    }

    impl TrackHandle for FakeHandle {
        fn stop(&self) {
            self.live.store(false, Ordering::SeqCst);
        }

        fn is_live(&self) -> bool {
            self.live.load(Ordering::SeqCst)
        }
    }

    pub fn track(id: &str, kind: TrackKind, source: TrackSource) -> MediaTrack {
        MediaTrack::new(id, kind, source, FakeHandle::new())
    }

    pub fn display_stream() -> MediaStream {
        MediaStream::new(vec![
            track("screen-video", TrackKind::Video, TrackSource::Display),
            track("screen-audio", TrackKind::Audio, TrackSource::Display),
        ])
    }

    pub fn microphone_stream() -> MediaStream {
        MediaStream::new(vec![track(
            "mic-audio",
            TrackKind::Audio,
            TrackSource::Microphone,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn stream_filters_by_kind() {
        let stream = display_stream();
        assert_eq!(stream.video_tracks().count(), 1);
        assert_eq!(stream.audio_tracks().count(), 1);
    }

    #[test]
    fn stop_is_shared_between_clones() {
        let track = track("t", TrackKind::Video, TrackSource::Display);
        let clone = track.clone();
        clone.stop();
        assert!(!track.is_live());
    }

    #[test]
    fn release_stops_all_tracks() {
        let stream = display_stream();
        stream.release();
        assert!(stream.tracks().iter().all(|t| !t.is_live()));
    }

    #[test]
    fn composite_orders_video_before_audio() {
        let display = display_stream();
        let mic = microphone_stream();
        let composite = CompositeStream::new(
            display.video_tracks().cloned().collect(),
            mic.audio_tracks().cloned().collect(),
        );
        let ids: Vec<&str> = composite.tracks().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["screen-video", "mic-audio"]);
    }
}
