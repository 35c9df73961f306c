use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Runs `work` behind a spinner, hidden when `quiet` is set.
pub fn with_spinner<T>(message: &str, quiet: bool, work: impl FnOnce() -> T) -> T {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        create_spinner(message)
    };
    let result = work();
    spinner.finish_and_clear();
    result
}
