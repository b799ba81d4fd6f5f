//! Errors raised while starting or talking to the backend process.
//!
//! I/O errors are wrapped in `Arc` so the enums stay cheap to clone and small
//! enough for the `result_large_err` lint.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// The backend could not be started.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The backend executable does not exist.
    #[error("backend executable not found: {command}")]
    BinaryNotFound {
        /// Executable that was looked up.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The operating system refused to start the backend.
    #[error("failed to start backend {command}: {message}")]
    SpawnFailed {
        /// Executable that was started.
        command: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<io::Error>>,
    },
}

impl LaunchError {
    pub(crate) fn from_spawn(command: String, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            Self::BinaryNotFound {
                command,
                source: Arc::new(error),
            }
        } else {
            Self::SpawnFailed {
                message: error.to_string(),
                command,
                source: Some(Arc::new(error)),
            }
        }
    }
}

/// A command could not be delivered to the backend.
#[derive(Debug, Error)]
pub enum SendError {
    /// The backend has already exited or been terminated.
    #[error("backend process is not running")]
    NotRunning,

    /// The command could not be encoded.
    #[error("failed to encode backend command: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing to the backend's stdin failed.
    #[error("failed to write to backend stdin: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl From<io::Error> for SendError {
    fn from(source: io::Error) -> Self {
        Self::Io {
            source: Arc::new(source),
        }
    }
}
