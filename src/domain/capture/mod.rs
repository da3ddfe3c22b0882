//! Capture domain module

mod artifact;
mod session;
mod track;

#[cfg(test)]
pub(crate) use track::testing;

pub use artifact::{human_readable_size, OutputArtifact, VideoMimeType, DEFAULT_OUTPUT_NAME};
pub use session::{CaptureSession, CaptureState, InvalidStateTransition, StopRequest};
pub use track::{
    CompositeStream, MediaStream, MediaTrack, TrackHandle, TrackKind, TrackSource,
};
