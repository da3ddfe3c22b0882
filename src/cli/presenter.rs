//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::capture::human_readable_size;
use crate::domain::feed::FeedEntry;
use crate::domain::paper::PaperMetadata;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        self.finish_spinner(format!("{} {}", "✓".green(), message));
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        self.finish_spinner(format!("{} {}", "✗".red(), message));
    }

    // A hidden spinner (stderr not a terminal) would swallow the final line
    fn finish_spinner(&mut self, line: String) {
        match self.spinner.take() {
            Some(spinner) if !spinner.is_hidden() => spinner.finish_with_message(line),
            Some(spinner) => {
                spinner.finish_and_clear();
                eprintln!("{}", line);
            }
            None => eprintln!("{}", line),
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Spinner text while recording
    pub fn format_recording(&self, bytes: usize) -> String {
        format!(
            "{} {} recorded. Press Enter or Ctrl-C to stop.",
            "Recording...".red().bold(),
            human_readable_size(bytes)
        )
    }

    /// Print verified paper details
    pub fn paper(&self, paper: &PaperMetadata) {
        self.key_value("Title", &paper.title);
        self.key_value("Journal", &paper.journal_display());
        self.key_value("Authors", &paper.authors_display());
    }

    /// Print one feed card
    pub fn feed_entry(&self, entry: &FeedEntry, path: &str) {
        println!("{} {}", "🔬".normal(), entry.title.bold());
        println!("   👤 {} | 📑 {}", entry.user, entry.journal);
        println!("   {}", path.dimmed());
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
