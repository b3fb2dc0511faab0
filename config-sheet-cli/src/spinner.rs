//! Terminal progress display for pipeline checkpoints.

use std::time::Duration;

use config_sheet_core::ProgressSink;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// A single spinner showing the current pipeline step.
pub(crate) struct SpinnerProgress {
    pb: ProgressBar,
}

impl SpinnerProgress {
    /// When `quiet` is true, the spinner is hidden.
    pub(crate) fn new(quiet: bool) -> Self {
        let pb = ProgressBar::new_spinner();
        if quiet {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("/-\\|");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }
}

impl ProgressSink for SpinnerProgress {
    fn on_step(&self, step: &str, current: usize, total: usize) {
        self.pb.set_message(format!("[{current}/{total}] {step}"));
    }

    fn on_complete(&self, message: &str) {
        self.pb.finish_and_clear();
        log::info!("{message}");
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}
