//! Progress reporting utilities using indicatif.
//!
//! Two phases render progress: the scan walk (a spinner counting files)
//! and the hash phase (a bar over candidate size classes). Quiet mode
//! swaps both for hidden bars so call sites stay unconditional.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Factory for the pipeline's progress bars.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    quiet: bool,
}

impl Progress {
    /// Create a new progress factory.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, all produced bars are hidden.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Spinner for the scan walk, ticking on its own and counting files.
    #[must_use]
    pub fn scan_spinner(&self) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        pb.set_message("Scanning");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Bar for the hash phase, sized to the number of candidate classes.
    #[must_use]
    pub fn hash_bar(&self, classes: u64) -> ProgressBar {
        if self.quiet {
            return ProgressBar::with_draw_target(Some(classes), ProgressDrawTarget::hidden());
        }
        let pb = ProgressBar::new(classes);
        pb.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-"),
        );
        pb.set_message("Hashing");
        pb
    }
}
