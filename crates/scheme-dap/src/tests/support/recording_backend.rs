//! Recording backend used in tests.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::BackendCommand;
use crate::process::{
    BackendHandle, BackendLauncher, LaunchError, LaunchSpec, SendError, SignalSink,
};

#[derive(Default)]
struct RecordingState {
    launches: Vec<LaunchSpec>,
    commands: Vec<BackendCommand>,
    terminations: usize,
    failure: Option<LaunchError>,
}

fn lock(shared: &Mutex<RecordingState>) -> MutexGuard<'_, RecordingState> {
    shared.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Launcher whose backends record every command instead of running.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingLauncher {
    /// Creates a launcher whose launches succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a launcher whose launches fail with `error`.
    pub fn failing(error: LaunchError) -> Self {
        let launcher = Self::default();
        lock(&launcher.shared).failure = Some(error);
        launcher
    }

    /// Returns an observer for assertions.
    pub fn observer(&self) -> RecordingObserver {
        RecordingObserver {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl BackendLauncher for RecordingLauncher {
    fn launch(
        &self,
        spec: &LaunchSpec,
        _sink: Arc<dyn SignalSink>,
    ) -> Result<Box<dyn BackendHandle>, LaunchError> {
        let mut state = lock(&self.shared);
        state.launches.push(spec.clone());
        if let Some(error) = state.failure.clone() {
            return Err(error);
        }
        Ok(Box::new(RecordingBackend {
            shared: Arc::clone(&self.shared),
            terminated: false,
        }))
    }
}

struct RecordingBackend {
    shared: Arc<Mutex<RecordingState>>,
    terminated: bool,
}

impl BackendHandle for RecordingBackend {
    fn send(&mut self, command: &BackendCommand) -> Result<(), SendError> {
        if self.terminated {
            return Err(SendError::NotRunning);
        }
        lock(&self.shared).commands.push(command.clone());
        Ok(())
    }

    fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        let mut state = lock(&self.shared);
        state.commands.push(BackendCommand::Quit);
        state.terminations += 1;
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// Read access to what the recording backends saw.
#[derive(Clone)]
pub struct RecordingObserver {
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingObserver {
    /// Every launch attempt, successful or not.
    pub fn launches(&self) -> Vec<LaunchSpec> {
        lock(&self.shared).launches.clone()
    }

    /// Every command written, in order.
    pub fn commands(&self) -> Vec<BackendCommand> {
        lock(&self.shared).commands.clone()
    }

    /// Forgets the commands recorded so far.
    pub fn clear_commands(&self) {
        lock(&self.shared).commands.clear();
    }

    /// Number of `quit` commands written.
    pub fn quit_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|command| **command == BackendCommand::Quit)
            .count()
    }

    /// Number of times a backend was terminated.
    pub fn terminations(&self) -> usize {
        lock(&self.shared).terminations
    }
}
