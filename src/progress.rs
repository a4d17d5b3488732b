//! Spinners for remote calls

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Start a spinner with a message
///
/// Hidden when `quiet` is set or stderr is not a terminal.
pub fn spinner(msg: &str, quiet: bool) -> ProgressBar {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Stop a spinner, leaving a success line
pub fn finish_success(pb: &ProgressBar, msg: &str) {
    finish(pb, format!("{} {}", "✓".green(), msg));
}

/// Stop a spinner, leaving an error line
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    finish(pb, format!("{} {}", "✗".red(), msg));
}

fn finish(pb: &ProgressBar, line: String) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(line);
}
