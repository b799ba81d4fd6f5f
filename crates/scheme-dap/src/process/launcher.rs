//! Production launcher backed by `std::process`.

use std::io::Write;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use super::error::{LaunchError, SendError};
use super::lifecycle::terminate_child;
use super::state::{ProcessState, lock};
use super::{BackendHandle, BackendLauncher, LaunchSpec, PROCESS_TARGET, SignalSink, readers};
use crate::backend::BackendCommand;

/// Spawns real backend processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl BackendLauncher for ProcessLauncher {
    fn launch(
        &self,
        spec: &LaunchSpec,
        sink: Arc<dyn SignalSink>,
    ) -> Result<Box<dyn BackendHandle>, LaunchError> {
        let backend = ProcessBackend::spawn(spec, &sink)?;
        Ok(Box::new(backend))
    }
}

/// A spawned backend process.
///
/// Dropping the handle terminates the process.
#[derive(Debug)]
pub struct ProcessBackend {
    pid: u32,
    stdin: Option<ChildStdin>,
    state: Arc<Mutex<ProcessState>>,
}

impl ProcessBackend {
    /// Spawns the backend described by `spec` and starts its helper threads.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] when the executable is missing, cannot be
    /// started, or its helper threads cannot be created.
    pub fn spawn(spec: &LaunchSpec, sink: &Arc<dyn SignalSink>) -> Result<Self, LaunchError> {
        let command_name = spec.executable().display().to_string();
        debug!(
            target: PROCESS_TARGET,
            command = %command_name,
            args = ?spec.args(),
            working_dir = ?spec.working_dir(),
            "spawning backend process"
        );

        let mut command = Command::new(spec.executable());
        command
            .args(spec.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = spec.working_dir() {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|error| LaunchError::from_spawn(command_name.clone(), error))?;
        let pid = child.id();

        let (stdin, stdout, stderr) = match take_pipes(&mut child, &command_name) {
            Ok(pipes) => pipes,
            Err(error) => {
                terminate_child(&mut child, pid);
                return Err(error);
            }
        };

        let state = Arc::new(Mutex::new(ProcessState::Running { child }));
        if let Err(error) = readers::start(pid, stdout, stderr, Arc::clone(&state), sink) {
            if let ProcessState::Running { mut child } =
                std::mem::replace(&mut *lock(&state), ProcessState::Stopped { code: None })
            {
                terminate_child(&mut child, pid);
            }
            return Err(LaunchError::SpawnFailed {
                command: command_name,
                message: String::from("failed to start backend reader threads"),
                source: Some(Arc::new(error)),
            });
        }

        debug!(target: PROCESS_TARGET, pid, "backend process spawned");
        Ok(Self {
            pid,
            stdin: Some(stdin),
            state,
        })
    }
}

fn take_pipes(
    child: &mut Child,
    command: &str,
) -> Result<(ChildStdin, ChildStdout, ChildStderr), LaunchError> {
    let missing = |stream: &str| LaunchError::SpawnFailed {
        command: command.to_owned(),
        message: format!("failed to capture {stream}"),
        source: None,
    };
    let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
    let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;
    Ok((stdin, stdout, stderr))
}

impl BackendHandle for ProcessBackend {
    fn send(&mut self, command: &BackendCommand) -> Result<(), SendError> {
        if lock(&self.state).is_stopped() {
            return Err(SendError::NotRunning);
        }
        let stdin = self.stdin.as_mut().ok_or(SendError::NotRunning)?;
        let line = command.to_line()?;
        stdin.write_all(line.as_bytes())?;
        stdin.flush()?;
        trace!(
            target: PROCESS_TARGET,
            pid = self.pid,
            command = command.name(),
            "sent backend command"
        );
        Ok(())
    }

    fn terminate(&mut self) {
        let Some(mut stdin) = self.stdin.take() else {
            return;
        };
        let mut state = lock(&self.state);
        if state.is_stopped() {
            return;
        }
        let ProcessState::Running { mut child } =
            std::mem::replace(&mut *state, ProcessState::Stopped { code: None })
        else {
            return;
        };

        debug!(target: PROCESS_TARGET, pid = self.pid, "terminating backend process");
        let quit = BackendCommand::Quit.to_line().map_err(SendError::from).and_then(|line| {
            stdin.write_all(line.as_bytes())?;
            stdin.flush()?;
            Ok(())
        });
        if let Err(error) = quit {
            debug!(target: PROCESS_TARGET, pid = self.pid, %error, "could not send quit");
        }
        drop(stdin);

        let code = terminate_child(&mut child, self.pid);
        *state = ProcessState::Stopped { code };
    }

    fn is_terminated(&self) -> bool {
        self.stdin.is_none() || lock(&self.state).is_stopped()
    }
}

impl Drop for ProcessBackend {
    fn drop(&mut self) {
        self.terminate();
    }
}
