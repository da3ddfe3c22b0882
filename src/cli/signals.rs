//! Stop triggers for interactive recording

use std::io::{self, BufRead};
use std::thread;

use tokio::sync::oneshot;

/// What ended the recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTrigger {
    /// Enter pressed on the terminal
    Enter,
    /// Ctrl-C
    Interrupt,
}

/// Read one line from stdin on a detached thread.
///
/// Resolves to `true` for a line and `false` at EOF. The thread is never
/// joined, so an unanswered read cannot hold up runtime shutdown.
fn spawn_line_reader() -> oneshot::Receiver<io::Result<bool>> {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let mut line = String::new();
        let result = io::stdin().lock().read_line(&mut line).map(|n| n > 0);
        let _ = tx.send(result);
    });
    rx
}

/// Wait for Enter or Ctrl-C.
///
/// With stdin closed (not a terminal, or piped from nowhere) only Ctrl-C
/// counts.
pub async fn wait_for_stop() -> io::Result<StopTrigger> {
    let line = spawn_line_reader();

    tokio::select! {
        interrupted = tokio::signal::ctrl_c() => {
            interrupted?;
            Ok(StopTrigger::Interrupt)
        }
        read = line => match read {
            Ok(Ok(true)) => Ok(StopTrigger::Enter),
            Ok(Err(e)) => Err(e),
            // EOF, or the reader thread went away
            Ok(Ok(false)) | Err(_) => {
                tokio::signal::ctrl_c().await?;
                Ok(StopTrigger::Interrupt)
            }
        },
    }
}
