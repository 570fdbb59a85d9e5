//! Error types for stderr-guard.

use std::os::fd::RawFd;

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for stderr-guard operations.
#[derive(Error, Debug)]
pub enum StderrGuardError {
    /// The original error stream could not be duplicated at startup.
    #[error("failed to duplicate descriptor {fd}: {source}")]
    Duplicate {
        fd: RawFd,
        #[source]
        source: std::io::Error,
    },

    /// The primary error stream could not be pointed at the target.
    #[error("failed to redirect descriptor {primary} to {target}: {source}")]
    Redirect {
        target: RawFd,
        primary: RawFd,
        #[source]
        source: std::io::Error,
    },

    /// The primary error stream could not be pointed back at the original.
    #[error("failed to restore descriptor {primary}: {source}")]
    Restore {
        primary: RawFd,
        #[source]
        source: std::io::Error,
    },

    /// Tracing subscriber setup failed.
    #[error("logging initialization failed: {0}")]
    Logging(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for stderr-guard operations.
pub type Result<T> = std::result::Result<T, StderrGuardError>;
