//! Adapter start-up: configuration, telemetry, then the session loop.

use std::io::{BufRead, Write};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;
use tracing::info;

use scheme_dap::{ProcessLauncher, RunnerError, SessionRunner};
use scheme_dap_config::Config;

use crate::telemetry::{self, TelemetryError};

const BOOTSTRAP_TARGET: &str = "scheme_dap::bootstrap";

/// Abstracts configuration loading for tests.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigLoader {
    /// Loads the adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when a layer cannot be read or merged.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Errors that stop the adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The session loop ended on a client stream failure.
    #[error("debug session failed: {source}")]
    Session {
        /// Underlying runner error.
        #[source]
        source: RunnerError,
    },
}

/// Loads configuration, installs telemetry and serves one session over
/// `input` and `output`.
///
/// # Errors
///
/// Returns an [`AdapterError`] naming the stage that failed.
pub fn serve<C, R, W>(loader: &C, input: R, output: W) -> Result<(), AdapterError>
where
    C: ConfigLoader + ?Sized,
    R: BufRead + Send + 'static,
    W: Write,
{
    let config = loader
        .load()
        .map_err(|source| AdapterError::Configuration { source })?;
    telemetry::initialise(&config).map_err(|source| AdapterError::Telemetry { source })?;
    info!(
        target: BOOTSTRAP_TARGET,
        log_format = %config.log_format(),
        backend_path = config.backend_path(),
        "adapter starting"
    );

    SessionRunner::new(ProcessLauncher)
        .with_fallback_backend(config.backend_path().map(str::to_owned))
        .run(input, output)
        .map_err(|source| AdapterError::Session { source })
}
