//! Terminal notifications

use async_trait::async_trait;
use colored::Colorize;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

/// Prints notifications to stderr, for sessions without a desktop
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }

    fn format(message: &str, icon: NotificationIcon) -> String {
        match icon {
            NotificationIcon::Info => format!("{} {}", "ℹ".blue(), message),
            NotificationIcon::Success => format!("{} {}", "✓".green(), message),
            NotificationIcon::Warning => format!("{} {}", "⚠".yellow(), message),
            NotificationIcon::Error => format!("{} {}", "✗".red(), message),
            NotificationIcon::Recording => format!("{} {}", "●".red().bold(), message),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(
        &self,
        _title: &str,
        message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        eprintln!("{}", Self::format(message, icon));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_keeps_message() {
        colored::control::set_override(false);
        assert_eq!(
            ConsoleNotifier::format("Recording access denied.", NotificationIcon::Error),
            "✗ Recording access denied."
        );
    }

    #[tokio::test]
    async fn notify_never_fails() {
        let notifier = ConsoleNotifier::new();
        assert!(notifier
            .notify("J-Club", "hello", NotificationIcon::Info)
            .await
            .is_ok());
    }
}
