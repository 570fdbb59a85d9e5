//! Redirection state tracking.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the primary error stream was last hijacked or restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectState {
    /// The primary stream points at the original console.
    #[default]
    Direct,
    /// The primary stream was handed to another descriptor.
    Redirected,
}

impl RedirectState {
    /// State after a `hijack` call. Both states move to `Redirected`.
    pub fn after_hijack(self) -> Self {
        RedirectState::Redirected
    }

    /// State after a `restore` call. Both states move to `Direct`.
    pub fn after_restore(self) -> Self {
        RedirectState::Direct
    }

    /// Check if this state means output on the primary stream is captured.
    pub fn is_redirected(&self) -> bool {
        matches!(self, RedirectState::Redirected)
    }
}

impl From<bool> for RedirectState {
    fn from(redirected: bool) -> Self {
        if redirected {
            RedirectState::Redirected
        } else {
            RedirectState::Direct
        }
    }
}

/// Best-effort, process-wide record of the last redirection transition.
///
/// Only used to pick which panic diagnostic to print. Readers may observe a
/// stale value while another thread is hijacking or restoring; relaxed
/// ordering is enough because nothing else is published through it.
#[derive(Debug, Default)]
pub struct RedirectionFlag {
    redirected: AtomicBool,
}

impl RedirectionFlag {
    /// Create a flag in the `Direct` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current state.
    pub fn get(&self) -> RedirectState {
        self.redirected.load(Ordering::Relaxed).into()
    }

    /// Overwrite the current state.
    pub fn set(&self, state: RedirectState) {
        self.redirected
            .store(state.is_redirected(), Ordering::Relaxed);
    }

    pub(crate) fn mark_hijacked(&self) {
        self.set(self.get().after_hijack());
    }

    pub(crate) fn mark_restored(&self) {
        self.set(self.get().after_restore());
    }
}
