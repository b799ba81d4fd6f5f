//! The session's slot for the current backend.

use tracing::{debug, warn};

use super::{BackendHandle, PROCESS_TARGET};
use crate::backend::BackendCommand;

/// Holds the backend handle, if any, and makes commands fire-and-forget.
///
/// Once the handle is cleared, by disconnect or because the process exited,
/// commands are dropped and [`BackendChannel::is_active`] reports `false`.
#[derive(Default)]
pub struct BackendChannel {
    handle: Option<Box<dyn BackendHandle>>,
}

impl BackendChannel {
    /// Creates an empty channel.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Installs a freshly launched backend.
    pub fn attach(&mut self, handle: Box<dyn BackendHandle>) {
        if let Some(mut previous) = self.handle.replace(handle) {
            warn!(target: PROCESS_TARGET, "replacing a live backend handle");
            previous.terminate();
        }
    }

    /// Reports whether a backend handle is installed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Sends `command` if a backend is attached. Failures are logged only.
    pub fn send(&mut self, command: &BackendCommand) {
        let Some(handle) = self.handle.as_mut() else {
            debug!(
                target: PROCESS_TARGET,
                command = command.name(),
                "no backend attached; dropping command"
            );
            return;
        };
        if let Err(error) = handle.send(command) {
            warn!(
                target: PROCESS_TARGET,
                command = command.name(),
                %error,
                "failed to send backend command"
            );
        }
    }

    /// Terminates and clears the backend. Returns whether one was attached.
    pub fn shutdown(&mut self) -> bool {
        match self.handle.take() {
            Some(mut handle) => {
                handle.terminate();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for BackendChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.handle {
            Some(handle) if handle.is_terminated() => "terminated",
            Some(_) => "running",
            None => "detached",
        };
        f.debug_struct("BackendChannel").field("state", &state).finish()
    }
}
