use indicatif::{HumanBytes, HumanCount, ProgressBar, ProgressStyle};
use std::time::Duration;

use disk_scout_core::messages::{DupeProgressMessage, ScanProgressMessage, SearchProgressMessage};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars(TICK_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Scan phase: spinner, total unknown upfront.
pub struct ScanProgressBar {
    bar: ProgressBar,
}

impl ScanProgressBar {
    pub fn new() -> Self {
        Self {
            bar: spinner("Scanning files..."),
        }
    }

    pub fn update(&self, progress: &ScanProgressMessage) {
        self.bar.set_message(format!(
            "Scanning... {} files in {} dirs, {} ({})",
            HumanCount(progress.files_found),
            HumanCount(progress.dirs_scanned),
            HumanBytes(progress.total_size),
            progress.current_path.display(),
        ));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Hash phases: bar with the per-phase total from the worker's messages.
pub struct DupeProgressBar {
    bar: ProgressBar,
}

impl DupeProgressBar {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} {prefix} [{bar:30.cyan/dim}] {pos}/{len} files {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { bar: pb }
    }

    pub fn update(&self, progress: &DupeProgressMessage) {
        self.bar.set_prefix(progress.phase.to_string());
        if self.bar.length() != Some(progress.total_to_hash as u64) {
            self.bar.set_length(progress.total_to_hash as u64);
        }
        self.bar.set_position(progress.files_hashed as u64);
        if progress.eta_secs > 0.0 {
            self.bar.set_message(format!("(~{:.0}s left)", progress.eta_secs));
        } else {
            self.bar.set_message("");
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Search phase: spinner; streamed matches are printed above it.
pub struct SearchProgressBar {
    bar: ProgressBar,
}

impl SearchProgressBar {
    pub fn new() -> Self {
        Self {
            bar: spinner("Searching..."),
        }
    }

    pub fn update(&self, progress: &SearchProgressMessage) {
        self.bar.set_message(format!(
            "Searching... {} dirs scanned, {} matches ({})",
            HumanCount(progress.dirs_scanned),
            progress.result_count,
            progress.current_path.display(),
        ));
    }

    /// Print one streamed match without disturbing the live spinner.
    pub fn println(&self, line: String) {
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
