//! Progress display for file loads

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Optional spinner showing rows streamed and throughput
pub struct LoadProgress {
    progress_bar: Option<ProgressBar>,
}

impl LoadProgress {
    pub fn new(enabled: bool, file_name: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} rows ({per_sec}) {msg}")
        {
            pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        pb.set_message(file_name.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn disabled() -> Self {
        Self { progress_bar: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.progress_bar.is_some()
    }

    /// Record the rows read so far and the batches written
    pub fn update(&self, rows_read: u64, batches_flushed: usize) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(rows_read);
            if batches_flushed > 0 {
                pb.set_message(format!("{} batches written", batches_flushed));
            }
        }
    }

    pub fn finish(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
            debug!("Progress finished: {}", message);
        }
    }

    pub fn finish_with_error(&self, error_message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.abandon_with_message(format!("Failed: {}", error_message));
        }
    }
}

impl Drop for LoadProgress {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
