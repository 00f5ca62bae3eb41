//! Progress indicators for running commands

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Percentage bar for progress-reporting commands
pub fn percent_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg:>14} [{bar:40.cyan/blue}] {pos:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Green spinner for commands without progress
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Add a 0..100 bar to `multi`
pub fn create_percent_bar(multi: &MultiProgress, message: &str) -> ProgressBar {
    let bar = multi.add(ProgressBar::new(100));
    bar.set_style(percent_bar_style());
    bar.set_message(message.to_string());
    bar
}

/// Add a ticking spinner to `multi`
pub fn create_spinner(multi: &MultiProgress, message: &str) -> ProgressBar {
    let spinner = multi.add(ProgressBar::new_spinner());
    spinner.set_style(spinner_style());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Position shown for a reported percentage; reports outside 0..=100 are pinned to the ends
pub fn bar_position(percent: i32) -> u64 {
    percent.clamp(0, 100) as u64
}
