//! Helpers for exercising widgets without a real drawing backend.

use tracing_subscriber::fmt;

/// A canvas that records draw operations.
pub mod canvas;
/// A fixed-size widget with an event log.
pub mod fixed;
/// Harness that drives a window.
pub mod harness;

pub use canvas::{DrawOp, RecordingCanvas};
pub use fixed::{EventLog, Fixed};
pub use harness::Harness;

/// Install a compact tracing formatter that writes through the test harness's captured output.
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let format = fmt::format()
        .with_level(true)
        .with_line_number(true)
        .with_ansi(false)
        .without_time()
        .compact();
    let installed = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .event_format(format)
        .try_init();
    if installed.is_err() {
        tracing::trace!("subscriber already installed");
    }
}
