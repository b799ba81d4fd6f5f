//! Backend process management.
//!
//! The bridge never blocks on the backend. A launch spawns the compiler with
//! piped stdio and three helper threads: one frames stdout into lines, one
//! forwards stderr, and one reports the exit. Everything they observe reaches
//! the session as [`BackendSignal`]s through a [`SignalSink`]. Commands are
//! written to stdin without waiting for any acknowledgement.
//!
//! [`BackendLauncher`] and [`BackendHandle`] are the seams that let the
//! session run against an in-memory backend in tests.

mod channel;
mod error;
mod launcher;
mod lifecycle;
mod readers;
mod state;

use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

pub use channel::BackendChannel;
pub use error::{LaunchError, SendError};
pub use launcher::{ProcessBackend, ProcessLauncher};

use crate::backend::BackendCommand;
use crate::framer::FramedLine;

/// Tracing target for backend process operations.
pub(crate) const PROCESS_TARGET: &str = "scheme_dap::process";

/// Flag that switches the compiler into its line-oriented JSON debug mode.
pub const DEBUG_JSON_FLAG: &str = "--debug-json";

/// Something observed on the backend process.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSignal {
    /// A complete line from stdout.
    Line(FramedLine),
    /// A chunk of stderr text, unframed.
    Stderr(String),
    /// The process exited. Delivered exactly once, after all output.
    Exited {
        /// Exit code, absent when the process was killed by a signal.
        code: Option<i32>,
    },
}

/// Receives [`BackendSignal`]s from the process helper threads.
pub trait SignalSink: Send + Sync {
    /// Delivers one signal. Returns `false` once nobody is listening.
    fn deliver(&self, signal: BackendSignal) -> bool;
}

impl SignalSink for mpsc::Sender<BackendSignal> {
    fn deliver(&self, signal: BackendSignal) -> bool {
        self.send(signal).is_ok()
    }
}

/// How to start the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    executable: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl LaunchSpec {
    /// Creates a spec with no arguments in the adapter's working directory.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Builds `<backend> --debug-json <program>` run from the program's
    /// directory.
    pub fn debug_session(backend: impl Into<PathBuf>, program: &str) -> Self {
        let working_dir = Path::new(program)
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Self {
            executable: backend.into(),
            args: vec![DEBUG_JSON_FLAG.to_owned(), program.to_owned()],
            working_dir,
        }
    }

    /// Replaces the argument list.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Executable to run.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Working directory, when one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}

/// Starts backends.
#[cfg_attr(test, mockall::automock)]
pub trait BackendLauncher {
    /// Spawns a backend and wires its output to `sink`.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] when the process cannot be started.
    fn launch(
        &self,
        spec: &LaunchSpec,
        sink: Arc<dyn SignalSink>,
    ) -> Result<Box<dyn BackendHandle>, LaunchError>;
}

/// A running backend.
pub trait BackendHandle: Send {
    /// Writes one command line to the backend.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] when the backend is gone or the write fails.
    fn send(&mut self, command: &BackendCommand) -> Result<(), SendError>;

    /// Sends `quit`, then kills and reaps the process. Idempotent.
    fn terminate(&mut self);

    /// Reports whether the process has exited or been terminated.
    fn is_terminated(&self) -> bool;
}
