//! Progress indicator for row imports

use indicatif::{ProgressBar, ProgressStyle};

/// Rows between progress redraws
pub const PROGRESS_INTERVAL: usize = 50;

/// In-place bar over a table's rows, drawn on stderr.
///
/// Returns a hidden bar when `visible` is false so callers can update it
/// unconditionally.
pub fn create_row_progress(total: usize, table: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("  {msg:<24} [{bar:30.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(table.to_string());
    pb
}

/// Advance `pb` to `done` rows if `done` falls on a redraw boundary or is
/// the last row
pub fn tick(pb: &ProgressBar, done: usize, total: usize) {
    if done % PROGRESS_INTERVAL == 0 || done == total {
        pb.set_position(done as u64);
    }
}
