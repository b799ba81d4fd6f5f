//! The session event loop.
//!
//! Client requests are read on a dedicated thread and backend signals arrive
//! from the process helper threads. Both are posted to one channel, so the
//! loop thread is the only writer of session state and of the client stream.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dap::{DapRequest, MessageReader, MessageWriter, TransportError};
use crate::process::{BackendLauncher, BackendSignal, SignalSink};
use crate::session::DebugSession;

const RUNNER_TARGET: &str = "scheme_dap::runner";

/// Input consumed by the event loop.
#[derive(Debug)]
pub enum SessionInput {
    /// A decoded client request.
    Request(DapRequest),
    /// A signal from the backend.
    Backend(BackendSignal),
    /// The client closed its stream.
    ClientClosed,
    /// The client stream failed and cannot be resynchronised.
    ClientFailed(TransportError),
}

/// Errors that end the event loop.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Reading from the client failed.
    #[error("failed to read from the client: {0}")]
    Read(#[source] TransportError),

    /// Writing to the client failed.
    #[error("failed to write to the client: {0}")]
    Write(#[source] TransportError),

    /// The client reader thread could not be started.
    #[error("failed to start the client reader thread: {0}")]
    ReaderThread(#[source] Arc<std::io::Error>),
}

struct ChannelSink {
    sender: Sender<SessionInput>,
}

impl SignalSink for ChannelSink {
    fn deliver(&self, signal: BackendSignal) -> bool {
        self.sender.send(SessionInput::Backend(signal)).is_ok()
    }
}

/// Runs one debug session over a client byte stream.
#[derive(Debug)]
pub struct SessionRunner<L> {
    launcher: L,
    fallback_backend: Option<String>,
}

impl<L: BackendLauncher> SessionRunner<L> {
    /// Creates a runner that starts backends with `launcher`.
    pub const fn new(launcher: L) -> Self {
        Self {
            launcher,
            fallback_backend: None,
        }
    }

    /// Sets the backend used when `launch` carries no compiler path.
    #[must_use]
    pub fn with_fallback_backend(mut self, backend: Option<String>) -> Self {
        self.fallback_backend = backend;
        self
    }

    /// Serves requests from `input`, writing responses and events to
    /// `output`, until the client disconnects or closes the stream.
    ///
    /// Any live backend is terminated before returning.
    ///
    /// # Errors
    ///
    /// Returns a [`RunnerError`] when the client stream fails.
    pub fn run<R, W>(self, input: R, output: W) -> Result<(), RunnerError>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let (sender, receiver) = mpsc::channel();
        spawn_client_reader(input, sender.clone())?;

        let sink: Arc<dyn SignalSink> = Arc::new(ChannelSink { sender });
        let mut session =
            DebugSession::new(self.launcher, sink).with_fallback_backend(self.fallback_backend);
        let mut writer = MessageWriter::new(output);

        let result = drive(&mut session, &receiver, &mut writer);
        session.shutdown();
        info!(target: RUNNER_TARGET, ok = result.is_ok(), "debug session finished");
        result
    }
}

fn drive<L, W>(
    session: &mut DebugSession<L>,
    receiver: &Receiver<SessionInput>,
    writer: &mut MessageWriter<W>,
) -> Result<(), RunnerError>
where
    L: BackendLauncher,
    W: Write,
{
    for input in receiver {
        let messages = match input {
            SessionInput::Request(request) => session.handle_request(&request),
            SessionInput::Backend(signal) => session.handle_signal(signal),
            SessionInput::ClientClosed => {
                info!(target: RUNNER_TARGET, "client closed the stream");
                return Ok(());
            }
            SessionInput::ClientFailed(error) => return Err(RunnerError::Read(error)),
        };
        for message in &messages {
            writer.write_message(message).map_err(RunnerError::Write)?;
        }
        if session.is_finished() {
            debug!(target: RUNNER_TARGET, "client disconnected");
            return Ok(());
        }
    }
    Ok(())
}

fn spawn_client_reader<R>(input: R, sender: Sender<SessionInput>) -> Result<(), RunnerError>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name(String::from("dap-client-reader"))
        .spawn(move || read_client(input, &sender))
        .map_err(|error| RunnerError::ReaderThread(Arc::new(error)))?;
    Ok(())
}

fn read_client<R: BufRead>(input: R, sender: &Sender<SessionInput>) {
    let mut reader = MessageReader::new(input);
    loop {
        let next = match reader.read_request() {
            Ok(Some(request)) => SessionInput::Request(request),
            Ok(None) => SessionInput::ClientClosed,
            Err(error) if error.is_recoverable() => {
                warn!(target: RUNNER_TARGET, %error, "skipping undecodable client message");
                continue;
            }
            Err(error) => SessionInput::ClientFailed(error),
        };
        let last = !matches!(next, SessionInput::Request(_));
        if sender.send(next).is_err() || last {
            return;
        }
    }
}
