//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod duration;
pub mod error;
pub mod feed;
pub mod paper;
pub mod slides;

// Re-export common types
pub use capture::{CaptureSession, CaptureState, MediaTrack, OutputArtifact, VideoMimeType};
pub use config::AppConfig;
pub use duration::Duration;
pub use error::*;
pub use feed::{FeedEntry, PublishName};
pub use paper::{Doi, PaperMetadata};
pub use slides::{Slide, SlideDeck};
