//! # stderr-guard
//!
//! Keep fatal panics visible on the operator's console while the process's
//! standard error is redirected into a log file.
//!
//! A server that captures stderr into its log file also captures the
//! default panic message, so a crash would otherwise be buried in a file
//! nobody is watching. This crate keeps a duplicate of the original error
//! stream, tracks whether stderr has been redirected, and reports panics
//! on the real console before letting them unwind as usual.
//!
//! ## Features
//!
//! - **Original stream**: a descriptor that survives `dup2` on stderr
//! - **Hijack / restore**: point descriptor 2 at a log file and back
//! - **Panic reporting**: flush the logger, then print the panic (or a
//!   hint) on the original console
//! - **Recovery wrappers**: for threads and async tasks; panics are always
//!   re-raised with the original payload
//!
//! ## Quick Start
//!
//! ```no_run
//! use stderr_guard::{logging, LoggingSection, StderrContext};
//!
//! fn main() -> stderr_guard::Result<()> {
//!     // Capture the original stderr before anything redirects it
//!     let ctx = StderrContext::init_or_abort();
//!
//!     // Log to a file and redirect stderr into it
//!     let section = LoggingSection {
//!         file: Some("/tmp/server.log".into()),
//!         ..LoggingSection::default()
//!     };
//!     logging::init(&section, &ctx)?;
//!
//!     // A panic here is reported on the console, then re-raised
//!     let worker = ctx.spawn("worker", || {
//!         tracing::info!("working");
//!     })?;
//!     let _ = worker.join();
//!
//!     Ok(())
//! }
//! ```

#[cfg(not(unix))]
compile_error!("stderr-guard requires a Unix platform");

pub mod cli;
pub mod config;
pub mod error;
pub mod flush;
pub mod logging;
pub mod stderr;

// Re-export commonly used types
pub use config::{Config, LoggingSection};
pub use error::{Result, StderrGuardError};
pub use flush::{Flush, NoopFlush, SharedFlush};
pub use logging::LogFile;
pub use stderr::{OriginalStream, RedirectState, RedirectionFlag, StderrContext, PANIC_HINT};
