//! Per-platform ffmpeg capture inputs

use crate::application::ports::CaptureError;

/// Frame rate requested from screen grabbers
pub const SCREEN_FRAMERATE: u32 = 30;

/// One ffmpeg input: demuxer, its options and the device to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub format: &'static str,
    pub options: Vec<(&'static str, String)>,
    pub device: String,
}

impl InputSpec {
    fn new(format: &'static str, device: impl Into<String>) -> Self {
        Self {
            format,
            options: Vec::new(),
            device: device.into(),
        }
    }

    fn option(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.options.push((name, value.into()));
        self
    }

    /// `-f <format> [options] -i <device>`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.format.to_string()];
        for (name, value) in &self.options {
            args.push(format!("-{}", name));
            args.push(value.clone());
        }
        args.push("-i".to_string());
        args.push(self.device.clone());
        args
    }
}

/// Screen grab input for the running desktop
#[cfg(target_os = "linux")]
pub fn display_input() -> Result<InputSpec, CaptureError> {
    let display = std::env::var("DISPLAY").map_err(|_| {
        CaptureError::PlatformUnavailable("no X11 display (DISPLAY is not set)".to_string())
    })?;
    Ok(InputSpec::new("x11grab", display).option("framerate", SCREEN_FRAMERATE.to_string()))
}

#[cfg(target_os = "macos")]
pub fn display_input() -> Result<InputSpec, CaptureError> {
    Ok(InputSpec::new("avfoundation", "Capture screen 0:none")
        .option("framerate", SCREEN_FRAMERATE.to_string())
        .option("capture_cursor", "1"))
}

#[cfg(target_os = "windows")]
pub fn display_input() -> Result<InputSpec, CaptureError> {
    Ok(InputSpec::new("gdigrab", "desktop").option("framerate", SCREEN_FRAMERATE.to_string()))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn display_input() -> Result<InputSpec, CaptureError> {
    Err(CaptureError::PlatformUnavailable(
        "screen capture is not supported on this platform".to_string(),
    ))
}

/// Default microphone input
#[cfg(target_os = "linux")]
pub fn microphone_input() -> Result<InputSpec, CaptureError> {
    Ok(InputSpec::new("pulse", "default"))
}

#[cfg(target_os = "macos")]
pub fn microphone_input() -> Result<InputSpec, CaptureError> {
    Ok(InputSpec::new("avfoundation", "none:0"))
}

#[cfg(target_os = "windows")]
pub fn microphone_input() -> Result<InputSpec, CaptureError> {
    let device = std::env::var("JCLUB_MIC_DEVICE").unwrap_or_else(|_| "Microphone".to_string());
    Ok(InputSpec::new("dshow", format!("audio={}", device)))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn microphone_input() -> Result<InputSpec, CaptureError> {
    Err(CaptureError::PlatformUnavailable(
        "microphone capture is not supported on this platform".to_string(),
    ))
}

/// Classify an ffmpeg failure by its stderr
pub fn classify_failure(stderr: &str) -> CaptureError {
    let last_line = last_line(stderr);
    let lower = stderr.to_lowercase();
    if ["permission denied", "not authorized", "access denied", "not permitted"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        CaptureError::PermissionDenied(last_line)
    } else {
        CaptureError::PlatformUnavailable(last_line)
    }
}

/// Last non-blank line of ffmpeg output
pub fn last_line(output: &str) -> String {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown error")
        .to_string()
}
