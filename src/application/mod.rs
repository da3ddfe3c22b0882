//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod capture;
pub mod feed;
pub mod ports;
pub mod publish;

// Re-export use cases
pub use capture::{
    CaptureController, CaptureControllerError, CaptureOutput, CaptureSettings, CaptureUpdate,
};
pub use feed::BrowseFeedUseCase;
pub use publish::{PublishError, PublishInput, PublishOutput, PublishTrailerUseCase};
