//! Catch, report and re-raise panics at thread and task entry points.

use std::future::Future;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use futures_util::FutureExt;

use super::StderrContext;

impl StderrContext {
    /// Run `f`, reporting any panic on the original stream before letting
    /// it continue to unwind with the same payload.
    ///
    /// The closure is never observed after a panic, so unwind safety is
    /// asserted rather than required.
    pub fn recover_and_report<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => value,
            Err(payload) => {
                self.report_panic(&*payload);
                panic::resume_unwind(payload)
            }
        }
    }

    /// Async counterpart of [`recover_and_report`](Self::recover_and_report).
    ///
    /// Wrap the body of a spawned task with this; the runtime then sees the
    /// original panic exactly as if the task had not been wrapped.
    pub async fn recover_future<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(value) => value,
            Err(payload) => {
                self.report_panic(&*payload);
                panic::resume_unwind(payload)
            }
        }
    }

    /// Spawn a named OS thread whose body runs under
    /// [`recover_and_report`](Self::recover_and_report).
    ///
    /// Joining a thread that panicked yields the original payload.
    pub fn spawn<F, T>(&self, name: impl Into<String>, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let ctx = self.clone();
        thread::Builder::new()
            .name(name.into())
            .spawn(move || ctx.recover_and_report(f))
    }
}
