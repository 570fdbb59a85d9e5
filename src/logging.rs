//! Logging initialization and the log file sink.
//!
//! When a log file is configured, events are buffered into it and the
//! buffer is drained through the [`Flush`] contract before a panic is
//! reported. With `capture_stderr` the primary error stream is also
//! hijacked onto the same file, so anything written straight to stderr
//! (including the default panic hook) ends up next to the log lines.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSection;
use crate::error::StderrGuardError;
use crate::flush::Flush;
use crate::stderr::StderrContext;
use crate::Result;

/// Filter used when the configured level does not parse.
pub const DEFAULT_FILTER: &str = "stderr_guard=info";

/// A buffered, append-only log file shared between the subscriber and the
/// panic reporter.
#[derive(Clone)]
pub struct LogFile {
    inner: Arc<LogFileInner>,
}

struct LogFileInner {
    path: PathBuf,
    fd: RawFd,
    writer: Mutex<BufWriter<File>>,
}

impl LogFile {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let fd = file.as_raw_fd();

        Ok(Self {
            inner: Arc::new(LogFileInner {
                path: path.to_path_buf(),
                fd,
                writer: Mutex::new(BufWriter::new(file)),
            }),
        })
    }

    /// Path the file was opened with.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Write buffered lines to disk.
    pub fn flush_pending(&self) -> io::Result<()> {
        self.lock().flush()
    }

    fn lock(&self) -> MutexGuard<'_, BufWriter<File>> {
        self.inner
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AsRawFd for LogFile {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.fd
    }
}

impl Flush for LogFile {
    fn flush(&self) {
        let _ = self.flush_pending();
    }
}

impl std::fmt::Debug for LogFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogFile")
            .field("path", &self.inner.path)
            .field("fd", &self.inner.fd)
            .finish()
    }
}

/// Writer handed to the fmt layer for a single event.
pub struct LogFileWriter<'a> {
    guard: MutexGuard<'a, BufWriter<File>>,
}

impl Write for LogFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.guard.flush()
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter { guard: self.lock() }
    }
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize logging from configuration.
///
/// Without a log file, events go to stderr and `None` is returned. With
/// one, the file becomes the context's flusher (also run from a chained
/// panic hook) and, if `capture_stderr` is set, the hijack target for the
/// primary error stream.
///
/// Returns an error if a subscriber is already installed or the hijack
/// fails.
pub fn init(config: &LoggingSection, ctx: &StderrContext) -> Result<Option<LogFile>> {
    let filter = filter_for(&config.level);

    let Some(path) = config.file.as_ref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(io::stderr))
            .try_init()
            .map_err(|e| StderrGuardError::Logging(e.to_string()))?;
        return Ok(None);
    };

    let log_file = LogFile::open(path)?;
    ctx.set_flusher(Arc::new(log_file.clone()));
    ctx.install_flush_hook();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(log_file.clone()),
        )
        .try_init()
        .map_err(|e| StderrGuardError::Logging(e.to_string()))?;

    if config.capture_stderr {
        ctx.hijack(log_file.as_raw_fd())?;
    }

    info!(
        path = %path.display(),
        capture_stderr = config.capture_stderr,
        "logging to file"
    );

    Ok(Some(log_file))
}

/// Try to initialize console logging from `RUST_LOG`.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> std::result::Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}
