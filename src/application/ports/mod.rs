//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod delivery;
pub mod feed;
pub mod metadata;
pub mod notifier;
pub mod slides;

// Re-export common types
pub use capture::{CaptureDevices, CaptureError, MediaRecorder, RecorderEvent, RecorderEvents};
pub use config::ConfigStore;
pub use delivery::{ArtifactSink, DeliveryError};
pub use feed::{FeedError, FeedStore};
pub use metadata::{MetadataError, MetadataProvider};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use slides::{SlideError, SlideRenderer};
