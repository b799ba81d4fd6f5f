//! Request-level failures reported to the client.

use thiserror::Error;

use crate::state::Lifecycle;

/// Why a request failed. The display text becomes the response `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Launch configuration is incomplete.
    #[error("{message}")]
    ConfigurationError {
        /// What is missing.
        message: String,
    },

    /// The request is not valid in the current lifecycle state.
    #[error("cannot handle '{command}' while the session is {state}")]
    Lifecycle {
        /// Request name.
        command: String,
        /// Current lifecycle state.
        state: Lifecycle,
    },

    /// The request arguments could not be decoded.
    #[error("invalid arguments for '{command}': {message}")]
    InvalidArguments {
        /// Request name.
        command: String,
        /// Decoder message.
        message: String,
    },

    /// The adapter does not implement the request.
    #[error("unsupported request '{command}'")]
    Unsupported {
        /// Request name.
        command: String,
    },

    /// `exceptionInfo` was requested but no exception stop was seen.
    #[error("no exception information available")]
    NoException,

    /// A response body could not be encoded.
    #[error("failed to encode response body: {message}")]
    Encode {
        /// Encoder message.
        message: String,
    },
}

impl RequestError {
    /// Builds a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}
