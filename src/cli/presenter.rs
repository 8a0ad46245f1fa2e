//! CLI presenter for output formatting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::recording::{Duration, RecordLimit, RecordingStatus};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a spinner currently owns the terminal line
    pub fn is_spinner_active(&self) -> bool {
        self.is_spinner_active.load(Ordering::SeqCst)
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.red} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout (paths and listings meant for scripts)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print a section heading (device names)
    pub fn heading(&self, text: &str) {
        println!("{}", text.bold());
    }

    /// Spinner line for an ongoing recording, e.g. `Recording 00:12 / 01:00`
    pub fn format_status_line(
        &self,
        status: RecordingStatus,
        elapsed: Duration,
        limit: Option<RecordLimit>,
    ) -> String {
        let label = match status {
            RecordingStatus::Started => "Recording".red().bold().to_string(),
            RecordingStatus::Paused => "Paused".yellow().to_string(),
            RecordingStatus::MaxReached => "Limit reached".cyan().to_string(),
            RecordingStatus::Failed => "Failed".red().to_string(),
            RecordingStatus::Idle => "Idle".dimmed().to_string(),
        };
        let cap = match limit {
            Some(limit) if limit.max_duration().is_some() => format!(" / {}", limit),
            Some(limit) => format!(" (max {})", limit),
            None => String::new(),
        };
        format!(
            "{} {}{}  {}",
            label,
            elapsed.clock(),
            cap,
            "[p] pause/resume  [s] stop  [x] discard".dimmed()
        )
    }

    /// Render an event on the spinner line
    pub fn update_recording_progress(
        &self,
        status: RecordingStatus,
        elapsed: Duration,
        limit: Option<RecordLimit>,
    ) {
        self.update_spinner(&self.format_status_line(status, elapsed, limit));
    }

    fn suspend(&self, print: impl FnOnce()) {
        match self.spinner {
            Some(ref spinner) => spinner.suspend(print),
            None => print(),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
