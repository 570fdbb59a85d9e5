//! Panic hook that drains the logger before the panic message is printed.

use std::panic;

use super::StderrContext;

impl StderrContext {
    /// Chain a panic hook that runs the installed flusher and then the
    /// previous hook.
    ///
    /// The standard hook prints the panic message before any unwinding
    /// starts. With stderr captured into the log file that message goes
    /// straight into the file, so buffered log lines have to be written out
    /// first or they would land after it.
    ///
    /// The flusher runs inside the hook, where a second panic aborts the
    /// process; it must not panic.
    pub fn install_flush_hook(&self) {
        let ctx = self.clone();
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            ctx.flush();
            previous(info);
        }));
    }
}
