//! Notification infrastructure module
//!
//! Desktop notifications through notify-rust, or plain terminal output
//! when they are turned off.

mod console;
mod notify_rust;

pub use console::ConsoleNotifier;
pub use notify_rust::{NotifyRustNotifier, DESKTOP_APP_NAME};

use crate::application::ports::Notifier;

/// Pick the notifier for the `notify` setting
pub fn create_notifier(desktop: bool) -> Box<dyn Notifier> {
    if desktop {
        Box::new(NotifyRustNotifier::new())
    } else {
        Box::new(ConsoleNotifier::new())
    }
}
