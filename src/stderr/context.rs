//! Process-wide stderr state and the hijack/restore transitions.

use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::{OriginalStream, RedirectState, RedirectionFlag};
use crate::error::StderrGuardError;
use crate::flush::{NoopFlush, SharedFlush};
use crate::Result;

/// Shared handle to the guarded error stream.
///
/// Create one at startup, before anything redirects the primary stream, and
/// hand clones to the logger and to every thread entry point that should
/// report panics. Clones share the same original stream, flag and flusher.
#[derive(Clone)]
pub struct StderrContext {
    inner: Arc<Inner>,
}

struct Inner {
    primary: RawFd,
    original: OriginalStream,
    flag: RedirectionFlag,
    flusher: RwLock<SharedFlush>,
}

impl StderrContext {
    /// Capture the process's standard error (descriptor 2).
    pub fn init() -> Result<Self> {
        Self::for_descriptor(libc::STDERR_FILENO)
    }

    /// Capture standard error, aborting the process if that is impossible.
    ///
    /// Without a duplicate of the original stream there is nowhere to send
    /// a crash diagnostic, so there is no degraded mode to fall back to.
    pub fn init_or_abort() -> Self {
        match Self::init() {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("stderr-guard: {e}");
                std::process::abort();
            }
        }
    }

    /// Guard an arbitrary primary descriptor instead of descriptor 2.
    pub fn for_descriptor(primary: RawFd) -> Result<Self> {
        let original = OriginalStream::duplicate(primary)?;
        debug!(
            primary,
            original = original.as_raw_fd(),
            "captured original error stream"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                primary,
                original,
                flag: RedirectionFlag::new(),
                flusher: RwLock::new(Arc::new(NoopFlush)),
            }),
        })
    }

    /// Point the primary stream at `target`.
    ///
    /// The flag is set to `Redirected` before the repoint is attempted and
    /// stays set if it fails; check the returned error to learn whether the
    /// descriptor actually moved.
    pub fn hijack(&self, target: RawFd) -> Result<()> {
        self.inner.flag.mark_hijacked();
        let primary = self.inner.primary;
        debug!(primary, target, "hijacking error stream");

        dup2(target, primary).map_err(|source| StderrGuardError::Redirect {
            target,
            primary,
            source,
        })
    }

    /// Point the primary stream back at the original.
    ///
    /// Same flag ordering as [`hijack`](Self::hijack): the flag reads
    /// `Direct` even if the repoint fails.
    pub fn restore(&self) -> Result<()> {
        self.inner.flag.mark_restored();
        let primary = self.inner.primary;
        debug!(primary, "restoring error stream");

        dup2(self.inner.original.as_raw_fd(), primary)
            .map_err(|source| StderrGuardError::Restore { primary, source })
    }

    /// Current value of the redirection flag.
    pub fn state(&self) -> RedirectState {
        self.inner.flag.get()
    }

    /// Shorthand for `state().is_redirected()`.
    pub fn is_redirected(&self) -> bool {
        self.state().is_redirected()
    }

    /// The guarded primary descriptor.
    pub fn primary_fd(&self) -> RawFd {
        self.inner.primary
    }

    /// The duplicate that still reaches the original console.
    pub fn original(&self) -> &OriginalStream {
        &self.inner.original
    }

    /// Install the logging subsystem's flush operation.
    pub fn set_flusher(&self, flusher: SharedFlush) {
        let mut slot = self
            .inner
            .flusher
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = flusher;
    }

    /// Run the installed flush operation.
    pub fn flush(&self) {
        let flusher: SharedFlush = match self.inner.flusher.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        flusher.flush();
    }
}

impl std::fmt::Debug for StderrContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StderrContext")
            .field("primary", &self.inner.primary)
            .field("original", &self.inner.original.as_raw_fd())
            .field("state", &self.state())
            .finish()
    }
}

fn dup2(src: RawFd, dst: RawFd) -> io::Result<()> {
    loop {
        // SAFETY: dup2 only manipulates the descriptor table; invalid
        // descriptors are reported through errno.
        if unsafe { libc::dup2(src, dst) } != -1 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}
