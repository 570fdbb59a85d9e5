//! The flush contract with the surrounding logging subsystem.
//!
//! The panic reporter only needs one thing from the logger: a way to push
//! buffered output to its destination before the final diagnostic is
//! printed.

use std::sync::Arc;

/// Synchronously drain buffered log output.
///
/// Implementations must be callable from any thread and should return
/// only once pending output has reached its destination.
pub trait Flush: Send + Sync {
    /// Flush all pending output.
    fn flush(&self);
}

/// A flusher that does nothing.
///
/// Used until the logging subsystem installs its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFlush;

impl Flush for NoopFlush {
    fn flush(&self) {}
}

impl<F> Flush for F
where
    F: Fn() + Send + Sync,
{
    fn flush(&self) {
        self()
    }
}

/// Type alias for a shared flusher.
pub type SharedFlush = Arc<dyn Flush>;
