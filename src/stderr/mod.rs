//! Guarded standard error.
//!
//! This module keeps a duplicate of the process's original error stream so
//! that a panic can still be shown on the operator's console after the
//! logger has pointed descriptor 2 at a log file.
//!
//! - [`StderrContext`] owns the duplicate and the redirection flag and
//!   provides `hijack` / `restore`.
//! - `report_panic` prints the final diagnostic after flushing the logger.
//! - `recover_and_report`, `recover_future` and `spawn` wrap thread and
//!   task entry points and re-raise the panic after reporting it.
//! - `install_flush_hook` drains the logger before the standard panic hook
//!   writes into a captured stderr.

mod context;
mod hook;
mod original;
mod recover;
mod report;
mod state;

pub use context::StderrContext;
pub use original::OriginalStream;
pub use report::{diagnostic, panic_message, PANIC_HINT};
pub use state::{RedirectState, RedirectionFlag};
