//! Redirection and panic reporting integration tests.
//!
//! Every test guards a tempfile descriptor standing in for stderr, so the
//! test harness's own descriptor 2 is never touched.

use std::any::Any;
use std::io::Write;
use std::os::fd::AsRawFd;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use stderr_guard::{RedirectState, StderrContext, StderrGuardError, PANIC_HINT};
use tempfile::NamedTempFile;

/// A fake console plus a context guarding it.
struct Harness {
    console: NamedTempFile,
    ctx: StderrContext,
}

impl Harness {
    fn new() -> Self {
        let console = NamedTempFile::new().unwrap();
        let ctx = StderrContext::for_descriptor(console.as_file().as_raw_fd()).unwrap();
        Self { console, ctx }
    }

    /// What reached the original console.
    fn console_output(&self) -> String {
        std::fs::read_to_string(self.console.path()).unwrap()
    }

    /// Write through the primary slot, wherever it currently points.
    fn write_primary(&self, text: &str) {
        self.console.as_file().write_all(text.as_bytes()).unwrap();
    }
}

fn payload<T: Any + Send>(value: T) -> Box<dyn Any + Send> {
    Box::new(value)
}

// ============================================================================
// Reporting Properties
// ============================================================================

#[test]
fn test_redirected_report_is_payload_and_newline() {
    for text in ["boom", "", "multi\nline", "unicode ✓"] {
        let h = Harness::new();
        let log = NamedTempFile::new().unwrap();
        h.ctx.hijack(log.as_file().as_raw_fd()).unwrap();

        h.ctx.report_panic(&*payload(text.to_string()));

        assert_eq!(h.console_output(), format!("{text}\n"));
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }
}

#[test]
fn test_direct_report_is_hint() {
    for text in ["x", "boom"] {
        let h = Harness::new();
        h.ctx.report_panic(&*payload(text));
        assert_eq!(h.console_output(), format!("{PANIC_HINT}\n"));
    }
}

#[test]
fn test_flush_precedes_diagnostic_in_both_states() {
    for redirect in [false, true] {
        let h = Harness::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        let recorder = Arc::clone(&events);
        let console_path = h.console.path().to_path_buf();
        h.ctx.set_flusher(Arc::new(move || {
            let written = std::fs::metadata(&console_path).unwrap().len();
            recorder.lock().unwrap().push(written);
        }));

        if redirect {
            h.ctx.hijack(-1).ok();
        }
        h.ctx.report_panic(&*payload("ordered"));

        assert_eq!(*events.lock().unwrap(), vec![0]);
        assert!(!h.console_output().is_empty());
    }
}

#[test]
fn test_concurrent_panics_each_flush_then_report() {
    let h = Harness::new();
    let log = NamedTempFile::new().unwrap();
    h.ctx.hijack(log.as_file().as_raw_fd()).unwrap();

    let flushes = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&flushes);
    h.ctx.set_flusher(Arc::new(move || {
        *counter.lock().unwrap() += 1;
    }));

    let handles: Vec<JoinHandle<()>> = (0..8)
        .map(|i| {
            h.ctx
                .spawn(format!("worker-{i}"), move || {
                    panic::panic_any(format!("worker {i} failed"))
                })
                .unwrap()
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_err());
    }

    assert_eq!(*flushes.lock().unwrap(), 8);
    let output = h.console_output();
    for i in 0..8 {
        assert!(output.contains(&format!("worker {i} failed\n")));
    }
    assert_eq!(output.lines().count(), 8);
}

// ============================================================================
// Recovery
// ============================================================================

#[test]
fn test_recover_never_swallows() {
    let h = Harness::new();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        h.ctx.recover_and_report(|| -> u32 { panic!("boom") })
    }));

    let payload = result.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
}

#[test]
fn test_recover_returns_value_without_report() {
    let h = Harness::new();
    let value = h.ctx.recover_and_report(|| "ok");
    assert_eq!(value, "ok");
    assert_eq!(h.console_output(), "");
}

// ============================================================================
// State Machine
// ============================================================================

#[test]
fn test_hijack_restore_hijack_is_redirected() {
    let h = Harness::new();
    let log = NamedTempFile::new().unwrap();
    let fd = log.as_file().as_raw_fd();

    h.ctx.hijack(fd).unwrap();
    h.ctx.restore().unwrap();
    h.ctx.hijack(fd).unwrap();

    assert_eq!(h.ctx.state(), RedirectState::Redirected);
}

#[test]
fn test_restore_twice_is_direct() {
    let h = Harness::new();
    h.ctx.restore().unwrap();
    h.ctx.restore().unwrap();
    assert_eq!(h.ctx.state(), RedirectState::Direct);
}

#[test]
fn test_rehijack_to_new_target() {
    let h = Harness::new();
    let first = NamedTempFile::new().unwrap();
    let second = NamedTempFile::new().unwrap();

    h.ctx.hijack(first.as_file().as_raw_fd()).unwrap();
    h.write_primary("one\n");
    h.ctx.hijack(second.as_file().as_raw_fd()).unwrap();
    h.write_primary("two\n");

    assert_eq!(std::fs::read_to_string(first.path()).unwrap(), "one\n");
    assert_eq!(std::fs::read_to_string(second.path()).unwrap(), "two\n");
    assert_eq!(h.console_output(), "");
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_failed_hijack_keeps_redirected_format() {
    let h = Harness::new();

    let err = h.ctx.hijack(-1).unwrap_err();
    assert!(matches!(err, StderrGuardError::Redirect { .. }));
    assert_eq!(h.ctx.state(), RedirectState::Redirected);

    // The primary slot never moved, but the flag says it did.
    h.write_primary("still console\n");
    h.ctx.report_panic(&*payload("x"));

    assert_eq!(h.console_output(), "still console\nx\n");
}

#[test]
fn test_restore_without_hijack() {
    let h = Harness::new();

    h.ctx.restore().unwrap();
    assert_eq!(h.ctx.state(), RedirectState::Direct);

    h.write_primary("console\n");
    assert_eq!(h.console_output(), "console\n");
}

#[test]
fn test_original_survives_full_cycle() {
    let h = Harness::new();
    let log = NamedTempFile::new().unwrap();

    h.ctx.hijack(log.as_file().as_raw_fd()).unwrap();
    h.write_primary("to log\n");
    h.ctx.restore().unwrap();
    h.write_primary("to console\n");

    assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "to log\n");
    assert_eq!(h.console_output(), "to console\n");
}
