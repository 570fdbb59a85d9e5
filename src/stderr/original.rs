//! A duplicate of the original error stream.

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

use crate::error::StderrGuardError;
use crate::Result;

/// A second descriptor for whatever the primary error stream pointed at
/// when it was captured.
///
/// Later `dup2` calls on the primary slot do not affect it, so writes here
/// always reach the original console. The descriptor is close-on-exec and
/// stays open for the lifetime of the handle.
#[derive(Debug)]
pub struct OriginalStream {
    file: File,
    source: RawFd,
}

impl OriginalStream {
    /// Duplicate `fd` into a new descriptor.
    ///
    /// `fd` must be open; it is only borrowed for the duration of the call.
    pub fn duplicate(fd: RawFd) -> Result<Self> {
        if fd < 0 {
            return Err(StderrGuardError::Duplicate {
                fd,
                source: io::Error::from_raw_os_error(libc::EBADF),
            });
        }

        // SAFETY: the descriptor is only used to issue F_DUPFD_CLOEXEC and is
        // not retained past this call.
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        let owned = borrowed
            .try_clone_to_owned()
            .map_err(|source| StderrGuardError::Duplicate { fd, source })?;

        Ok(Self {
            file: File::from(owned),
            source: fd,
        })
    }

    /// Descriptor number this stream was duplicated from.
    pub fn source_fd(&self) -> RawFd {
        self.source
    }
}

impl AsRawFd for OriginalStream {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl AsFd for OriginalStream {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl Write for &OriginalStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&self.file).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&self.file).flush()
    }
}
