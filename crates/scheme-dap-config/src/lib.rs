//! Layered configuration for the Scheme debug adapter.
//!
//! Values resolve from built-in defaults, then an optional configuration
//! file, then `SCHEME_DAP_*` environment variables, and finally command-line
//! flags. The adapter reads this once at start-up; the debug session itself
//! receives its per-launch settings from the client's `launch` request and
//! only falls back to [`Config::backend_path`] when the client omits the
//! compiler path.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SCHEME_DAP")]
pub struct Config {
    /// `tracing` filter expression applied to adapter logs.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Rendering used for adapter logs on stderr.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Backend executable used when a launch request carries no compiler path.
    pub backend_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            backend_path: None,
        }
    }
}

impl Config {
    /// Returns the log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the fallback backend executable, ignoring blank values.
    #[must_use]
    pub fn backend_path(&self) -> Option<&str> {
        self.backend_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}
