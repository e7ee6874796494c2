//! Console download progress and cancellation wiring.
//!
//! The provisioner reports byte-level progress through a callback; this
//! module renders it as a single rewritten console line and feeds a Ctrl-C
//! flag back as the cancellation signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Minimum interval between console updates.
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Shared cancellation flag set by the Ctrl-C handler.
pub fn cancellation_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));

    let handler_flag = Arc::clone(&flag);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handler_flag.store(true, Ordering::SeqCst);
        }
    });

    flag
}

/// Console renderer for download progress.
pub struct ProgressLine {
    last_redraw: Option<Instant>,
    drew_anything: bool,
}

impl ProgressLine {
    /// Creates a renderer that has drawn nothing yet.
    pub fn new() -> Self {
        Self {
            last_redraw: None,
            drew_anything: false,
        }
    }

    /// Redraws the progress line, throttled to the redraw interval.
    pub fn update(&mut self, bytes_done: u64, bytes_total: Option<u64>) {
        let due = self
            .last_redraw
            .is_none_or(|at| at.elapsed() >= REDRAW_INTERVAL);
        if !due {
            return;
        }
        self.last_redraw = Some(Instant::now());
        self.drew_anything = true;

        match bytes_total {
            Some(total) if total > 0 => {
                let percent = bytes_done * 100 / total;
                eprint!(
                    "\r  downloading {} / {} ({percent}%)   ",
                    format_bytes(bytes_done),
                    format_bytes(total),
                );
            }
            _ => {
                eprint!("\r  downloading {}   ", format_bytes(bytes_done));
            }
        }
    }

    /// Terminates the progress line if one was drawn.
    pub fn finish(&mut self) {
        if self.drew_anything {
            eprintln!();
        }
    }
}

impl Default for ProgressLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a byte count with a binary-unit suffix.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
