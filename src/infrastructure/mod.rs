//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like FFmpeg, CrossRef, poppler, etc.

pub mod capture;
pub mod config;
pub mod delivery;
pub mod feed;
pub mod metadata;
pub mod notification;
pub mod slides;

// Re-export adapters
pub use capture::{FfmpegCaptureDevices, FfmpegMediaRecorder};
pub use config::XdgConfigStore;
pub use delivery::DownloadDirSink;
pub use feed::DirectoryFeedStore;
pub use metadata::CrossrefClient;
pub use notification::{create_notifier, ConsoleNotifier, NotifyRustNotifier};
pub use slides::PdftoppmRenderer;
