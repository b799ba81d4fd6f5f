//! Shared state of a spawned backend process.

use std::process::Child;
use std::sync::{Mutex, MutexGuard};

/// Ownership of the child process, shared with the exit watcher thread.
#[derive(Debug)]
pub(super) enum ProcessState {
    /// The process may still be running.
    Running {
        /// The child process handle.
        child: Child,
    },
    /// The process has been reaped.
    Stopped {
        /// Exit code, absent when killed by a signal or unknown.
        code: Option<i32>,
    },
}

impl ProcessState {
    pub(super) const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped { .. })
    }
}

/// Locks the state, recovering from poisoning so shutdown can still proceed.
pub(super) fn lock(state: &Mutex<ProcessState>) -> MutexGuard<'_, ProcessState> {
    state.lock().unwrap_or_else(|poison| poison.into_inner())
}
