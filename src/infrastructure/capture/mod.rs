//! Native capture adapters backed by ffmpeg

mod ffmpeg_devices;
mod ffmpeg_recorder;
mod platform;

pub use ffmpeg_devices::{DeviceHandle, FfmpegCaptureDevices};
pub use ffmpeg_recorder::FfmpegMediaRecorder;
