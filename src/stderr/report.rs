//! Panic diagnostics on the original error stream.

use std::any::Any;
use std::borrow::Cow;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use super::StderrContext;

/// Printed when the flag says the primary stream was not redirected. The
/// flag is only a hint, so point the operator at the log file anyway.
pub const PANIC_HINT: &str = "\nERROR: a panic has occurred!\n\
If no details are printed below, check the log file for details.";

/// Render a panic payload as text.
///
/// `panic!` produces either a `&'static str` or a `String`; anything else
/// (from `panic_any`) is shown the way the standard hook shows it.
pub fn panic_message(payload: &(dyn Any + Send)) -> Cow<'_, str> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(*s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        Cow::Borrowed(s.as_str())
    } else {
        Cow::Borrowed("Box<dyn Any>")
    }
}

/// The exact text `report_panic` writes for a payload in a given state.
pub fn diagnostic(payload: &(dyn Any + Send), redirected: bool) -> String {
    if redirected {
        format!("{}\n", panic_message(payload))
    } else {
        format!("{PANIC_HINT}\n")
    }
}

impl StderrContext {
    /// Report a captured panic on the original error stream.
    ///
    /// Flushes the logger first so the diagnostic never appears ahead of
    /// log lines that were written earlier. When the primary stream is
    /// redirected the panic text is copied to the console, since the
    /// default hook's output went to the log file; otherwise a hint is
    /// printed. Never panics and ignores write failures.
    pub fn report_panic(&self, payload: &(dyn Any + Send)) {
        // A misbehaving flusher must not replace the panic being reported.
        let _ = panic::catch_unwind(AssertUnwindSafe(|| self.flush()));

        let text = diagnostic(payload, self.is_redirected());
        let mut out = self.original();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsRawFd;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn guarded() -> (NamedTempFile, StderrContext) {
        let console = NamedTempFile::new().unwrap();
        let ctx = StderrContext::for_descriptor(console.as_file().as_raw_fd()).unwrap();
        (console, ctx)
    }

    #[test]
    fn test_panic_message_str() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");
    }

    #[test]
    fn test_panic_message_string() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("index 3 out of range"));
        assert_eq!(panic_message(&*payload), "index 3 out of range");
    }

    #[test]
    fn test_panic_message_other() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(&*payload), "Box<dyn Any>");
    }

    #[test]
    fn test_report_direct_prints_hint() {
        let (console, ctx) = guarded();
        let payload: Box<dyn Any + Send> = Box::new("x");

        ctx.report_panic(&*payload);

        let out = std::fs::read_to_string(console.path()).unwrap();
        assert_eq!(out, format!("{PANIC_HINT}\n"));
        assert!(!out.contains("x\n"));
    }

    #[test]
    fn test_report_redirected_prints_payload() {
        let (console, ctx) = guarded();
        let log = NamedTempFile::new().unwrap();
        ctx.hijack(log.as_file().as_raw_fd()).unwrap();

        let payload: Box<dyn Any + Send> = Box::new(String::from("boom"));
        ctx.report_panic(&*payload);

        assert_eq!(std::fs::read_to_string(console.path()).unwrap(), "boom\n");
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }

    #[test]
    fn test_flush_runs_before_write() {
        let (console, ctx) = guarded();
        let path = console.path().to_path_buf();
        let empty_at_flush = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&empty_at_flush);

        ctx.set_flusher(Arc::new(move || {
            let len = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(u64::MAX);
            seen.store(len == 0, Ordering::SeqCst);
        }));

        let payload: Box<dyn Any + Send> = Box::new("late");
        ctx.report_panic(&*payload);

        assert!(empty_at_flush.load(Ordering::SeqCst));
        assert!(!std::fs::read_to_string(console.path()).unwrap().is_empty());
    }

    #[test]
    fn test_panicking_flusher_is_swallowed() {
        let (console, ctx) = guarded();
        ctx.set_flusher(Arc::new(|| panic!("flush failed")));
        ctx.hijack(-1).ok();

        let payload: Box<dyn Any + Send> = Box::new("original");
        ctx.report_panic(&*payload);

        assert_eq!(
            std::fs::read_to_string(console.path()).unwrap(),
            "original\n"
        );
    }

    #[test]
    fn test_diagnostic_text() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(diagnostic(&*payload, true), "boom\n");
        assert!(diagnostic(&*payload, false).starts_with("\nERROR: a panic has occurred!\n"));
    }
}
