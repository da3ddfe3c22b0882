//! FFmpeg-based media recorder adapter
//!
//! Muxes the composite stream to WebM on ffmpeg's stdout and forwards
//! every read as a data event.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::application::ports::{CaptureError, MediaRecorder, RecorderEvent, RecorderEvents};
use crate::domain::capture::{CompositeStream, TrackSource};

use super::platform::{display_input, last_line, microphone_input, InputSpec};

/// Bytes requested per stdout read
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Output encoding: VP8 video and Opus audio in a live WebM stream
const OUTPUT_ARGS: &[&str] = &[
    "-c:v", "libvpx", "-deadline", "realtime", "-cpu-used", "8", "-b:v", "2M",
    "-c:a", "libopus", "-b:a", "96k",
    "-f", "webm", "pipe:1",
];

struct ActiveRecording {
    pid: Option<u32>,
    #[cfg(not(unix))]
    stdin: Option<tokio::process::ChildStdin>,
    stop_requested: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

/// Recorder driving one ffmpeg process per recording
pub struct FfmpegMediaRecorder {
    binary: String,
    active: Mutex<Option<ActiveRecording>>,
}

impl FfmpegMediaRecorder {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            active: Mutex::new(None),
        }
    }

    /// Map composite tracks to ffmpeg inputs: display video to the screen
    /// grabber, microphone audio to the default input.
    fn build_inputs(stream: &CompositeStream) -> Result<Vec<(InputSpec, &'static str)>, CaptureError> {
        if let Some(released) = stream.tracks().find(|t| !t.is_live()) {
            return Err(CaptureError::RecorderStartFailed(format!(
                "track {} was released",
                released.id()
            )));
        }

        let mut inputs = Vec::new();
        for track in stream.video_tracks() {
            if track.source() == TrackSource::Display {
                inputs.push((display_input()?, "v"));
            }
        }
        for track in stream.audio_tracks() {
            if track.source() == TrackSource::Microphone {
                inputs.push((microphone_input()?, "a"));
            }
        }

        if inputs.is_empty() {
            return Err(CaptureError::RecorderStartFailed(
                "composite stream has no recordable tracks".to_string(),
            ));
        }
        Ok(inputs)
    }

    /// Build FFmpeg args for the given inputs
    fn build_ffmpeg_args(inputs: &[(InputSpec, &'static str)]) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        // Stop comes as SIGINT on unix; elsewhere ffmpeg listens for "q"
        #[cfg(unix)]
        args.push("-nostdin".to_string());

        for (input, _) in inputs {
            args.extend(input.to_args());
        }
        for (index, (_, media)) in inputs.iter().enumerate() {
            args.push("-map".to_string());
            args.push(format!("{}:{}", index, media));
        }
        args.extend(OUTPUT_ARGS.iter().map(|s| s.to_string()));
        args
    }

    fn spawn_ffmpeg(&self, args: &[String]) -> Result<Child, CaptureError> {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group: a terminal Ctrl-C reaches jclub only, and the
        // stop request is the single SIGINT ffmpeg sees
        #[cfg(unix)]
        command.stdin(Stdio::null()).process_group(0);
        #[cfg(not(unix))]
        command.stdin(Stdio::piped());

        command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CaptureError::RecorderStartFailed(format!(
                    "{} not found. Please install ffmpeg.",
                    self.binary
                ))
            } else {
                CaptureError::RecorderStartFailed(e.to_string())
            }
        })
    }

    /// Ask ffmpeg to finish the file
    #[cfg(unix)]
    async fn request_finalize(recording: &mut ActiveRecording) -> Result<(), CaptureError> {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        match recording.pid {
            Some(pid) => finalize_result(signal::kill(Pid::from_raw(pid as i32), Signal::SIGINT)),
            None => Ok(()),
        }
    }

    #[cfg(not(unix))]
    async fn request_finalize(recording: &mut ActiveRecording) -> Result<(), CaptureError> {
        use tokio::io::AsyncWriteExt;

        if let Some(mut stdin) = recording.stdin.take() {
            stdin
                .write_all(b"q")
                .await
                .map_err(|e| CaptureError::RecorderFailed(format!("Stop request failed: {}", e)))?;
        }
        Ok(())
    }
}

impl Default for FfmpegMediaRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// ESRCH means ffmpeg already exited and was reaped; its finalize event
/// is on the way
#[cfg(unix)]
fn finalize_result(result: nix::Result<()>) -> Result<(), CaptureError> {
    match result {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(CaptureError::RecorderFailed(format!("Signal failed: {}", e))),
    }
}

/// Keep the last stderr line for error reports
fn collect_stderr(stderr: Option<ChildStderr>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut tail = String::new();
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "ffmpeg", "{}", line);
                if !line.trim().is_empty() {
                    tail = line;
                }
            }
        }
        tail
    })
}

/// Forward stdout reads until EOF, then report how the process ended
async fn pump_output(
    mut child: Child,
    mut stdout: ChildStdout,
    stderr_tail: JoinHandle<String>,
    tx: mpsc::UnboundedSender<RecorderEvent>,
    stop_requested: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
) {
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    let read_error = loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break None,
            Ok(n) => {
                if tx.send(RecorderEvent::DataAvailable(buf[..n].to_vec())).is_err() {
                    // Nobody is listening any more
                    let _ = child.start_kill();
                    break None;
                }
            }
            Err(e) => {
                let _ = child.start_kill();
                break Some(e.to_string());
            }
        }
    };

    let status = child.wait().await;
    // The pid is reaped from here on and must not be signalled
    finished.store(true, Ordering::SeqCst);
    let tail = stderr_tail.await.unwrap_or_default();

    let event = match (read_error, status) {
        (Some(e), _) => RecorderEvent::Failed(format!("Failed to read recorder output: {}", e)),
        (None, Ok(status)) if status.success() || stop_requested.load(Ordering::SeqCst) => {
            RecorderEvent::Finalized
        }
        (None, Ok(_)) => RecorderEvent::Failed(format!(
            "FFmpeg exited with error: {}",
            last_line(&tail)
        )),
        (None, Err(e)) => RecorderEvent::Failed(format!("FFmpeg failed: {}", e)),
    };
    tracing::debug!(?event, "recorder process ended");
    let _ = tx.send(event);
}

#[async_trait]
impl MediaRecorder for FfmpegMediaRecorder {
    async fn start(&self, stream: &CompositeStream) -> Result<RecorderEvents, CaptureError> {
        let mut active = self.active.lock().await;
        if let Some(recording) = active.as_ref() {
            if !recording.finished.load(Ordering::SeqCst) {
                return Err(CaptureError::RecorderStartFailed(
                    "Recording already in progress".to_string(),
                ));
            }
        }

        let inputs = Self::build_inputs(stream)?;
        let args = Self::build_ffmpeg_args(&inputs);
        tracing::debug!(args = ?args, "starting ffmpeg");

        let mut child = self.spawn_ffmpeg(&args)?;
        let stdout = child.stdout.take().ok_or_else(|| {
            CaptureError::RecorderStartFailed("ffmpeg stdout unavailable".to_string())
        })?;
        let stderr_tail = collect_stderr(child.stderr.take());

        let stop_requested = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::unbounded_channel();

        *active = Some(ActiveRecording {
            pid: child.id(),
            #[cfg(not(unix))]
            stdin: child.stdin.take(),
            stop_requested: Arc::clone(&stop_requested),
            finished: Arc::clone(&finished),
        });

        tokio::spawn(pump_output(child, stdout, stderr_tail, tx, stop_requested, finished));

        Ok(rx)
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        let mut active = self.active.lock().await;
        let recording = active.as_mut().ok_or_else(|| {
            CaptureError::RecorderFailed("No recording in progress".to_string())
        })?;

        if recording.finished.load(Ordering::SeqCst)
            || recording.stop_requested.swap(true, Ordering::SeqCst)
        {
            return Ok(());
        }

        Self::request_finalize(recording).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(format: &'static str, device: &str) -> InputSpec {
        InputSpec {
            format,
            options: Vec::new(),
            device: device.to_string(),
        }
    }

    #[test]
    fn args_map_each_input_once() {
        let inputs = vec![(spec("x11grab", ":0"), "v"), (spec("pulse", "default"), "a")];
        let args = FfmpegMediaRecorder::build_ffmpeg_args(&inputs);
        let joined = args.join(" ");

        assert!(joined.contains("-f x11grab -i :0 -f pulse -i default"));
        assert!(joined.contains("-map 0:v -map 1:a"));
        assert!(joined.ends_with("-f webm pipe:1"));
    }

    #[cfg(unix)]
    #[test]
    fn unix_args_disable_stdin() {
        let args = FfmpegMediaRecorder::build_ffmpeg_args(&[(spec("pulse", "default"), "a")]);
        assert!(args.contains(&"-nostdin".to_string()));
    }

    #[tokio::test]
    async fn stop_without_recording_fails() {
        let recorder = FfmpegMediaRecorder::new();
        assert!(matches!(
            recorder.stop().await,
            Err(CaptureError::RecorderFailed(_))
        ));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn missing_binary_fails_to_start() {
        use crate::domain::capture::{MediaStream, MediaTrack, TrackKind};
        use crate::infrastructure::capture::DeviceHandle;

        let microphone = MediaStream::new(vec![MediaTrack::new(
            "mic",
            TrackKind::Audio,
            TrackSource::Microphone,
            DeviceHandle::new(),
        )]);
        let mut session = crate::domain::capture::CaptureSession::new();
        session.begin_request().unwrap();
        let composite = session
            .attach_streams(MediaStream::default(), microphone)
            .unwrap();

        let recorder = FfmpegMediaRecorder::with_binary("jclub-test-no-such-ffmpeg");
        let err = recorder.start(&composite).await.unwrap_err();
        assert!(matches!(err, CaptureError::RecorderStartFailed(ref m) if m.contains("not found")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn recorder_process_gets_its_own_group() {
        use nix::unistd::{getpgid, Pid};

        let recorder = FfmpegMediaRecorder::with_binary("sleep");
        let mut child = recorder.spawn_ffmpeg(&["5".to_string()]).unwrap();
        let pid = Pid::from_raw(child.id().unwrap() as i32);

        assert_eq!(getpgid(Some(pid)).unwrap(), pid);
        assert_ne!(getpgid(None).unwrap(), pid);
        child.kill().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn finalizing_an_exited_process_is_not_an_error() {
        let mut child = tokio::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().await.unwrap();

        let mut recording = ActiveRecording {
            pid,
            stop_requested: Arc::new(AtomicBool::new(true)),
            finished: Arc::new(AtomicBool::new(false)),
        };
        assert!(FfmpegMediaRecorder::request_finalize(&mut recording)
            .await
            .is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn signal_errors_other_than_missing_process_fail() {
        use nix::errno::Errno;

        assert!(finalize_result(Err(Errno::ESRCH)).is_ok());
        assert!(matches!(
            finalize_result(Err(Errno::EPERM)),
            Err(CaptureError::RecorderFailed(_))
        ));
    }
}
