//! The session bridge: owns the state store and the backend slot, and turns
//! client requests and backend signals into outgoing client messages.
//!
//! [`DebugSession`] performs no I/O of its own. The runner feeds it one input
//! at a time and writes whatever messages it returns.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::dap::{DapEvent, DapMessage, DapRequest, DapResponse};
use crate::errors::RequestError;
use crate::events::FrontEndEvent;
use crate::framer::FramedLine;
use crate::handlers::lifecycle::LaunchEnvironment;
use crate::handlers::{
    Command, Context, HandlerResult, Reply, breakpoints, decode_arguments, execution, inspection,
    lifecycle,
};
use crate::process::{BackendChannel, BackendLauncher, BackendSignal, SignalSink};
use crate::state::{Lifecycle, SessionStore};
use crate::translate::{translate, translate_text};

const SESSION_TARGET: &str = "scheme_dap::session";

/// One debug session between a client and at most one backend.
pub struct DebugSession<L> {
    launcher: L,
    sink: Arc<dyn SignalSink>,
    fallback_backend: Option<String>,
    store: SessionStore,
    backend: BackendChannel,
    last_seq: i64,
    terminated_sent: bool,
    disconnected: bool,
}

impl<L: BackendLauncher> DebugSession<L> {
    /// Creates a session that starts backends with `launcher` and routes
    /// their signals to `sink`.
    pub fn new(launcher: L, sink: Arc<dyn SignalSink>) -> Self {
        Self {
            launcher,
            sink,
            fallback_backend: None,
            store: SessionStore::new(),
            backend: BackendChannel::new(),
            last_seq: 0,
            terminated_sent: false,
            disconnected: false,
        }
    }

    /// Sets the backend used when `launch` carries no compiler path.
    #[must_use]
    pub fn with_fallback_backend(mut self, backend: Option<String>) -> Self {
        self.fallback_backend = backend;
        self
    }

    /// Handles one client request and returns its response followed by any
    /// events it triggered.
    pub fn handle_request(&mut self, request: &DapRequest) -> Vec<DapMessage> {
        debug!(
            target: SESSION_TARGET,
            seq = request.seq,
            command = %request.command,
            "handling request"
        );
        let outcome = self.dispatch(request);
        let mut messages = Vec::new();
        match outcome {
            Ok(reply) => {
                let seq = self.next_seq();
                messages.push(DapMessage::Response(DapResponse::success(
                    seq, request, reply.body,
                )));
                self.emit(reply.events, &mut messages);
            }
            Err(error) => {
                warn!(
                    target: SESSION_TARGET,
                    command = %request.command,
                    %error,
                    "request failed"
                );
                let seq = self.next_seq();
                messages.push(DapMessage::Response(DapResponse::failure(
                    seq,
                    request,
                    error.to_string(),
                )));
            }
        }
        messages
    }

    /// Handles one signal from the backend.
    ///
    /// Signals that arrive after the backend was detached are dropped.
    pub fn handle_signal(&mut self, signal: BackendSignal) -> Vec<DapMessage> {
        if !self.backend.is_active() {
            trace!(target: SESSION_TARGET, ?signal, "dropping signal from detached backend");
            return Vec::new();
        }
        let events = match signal {
            BackendSignal::Line(FramedLine::Event(event)) => translate(&mut self.store, event),
            BackendSignal::Line(FramedLine::Text(line)) => vec![translate_text(&line)],
            BackendSignal::Stderr(text) => vec![FrontEndEvent::output("stderr", text)],
            BackendSignal::Exited { code } => {
                info!(target: SESSION_TARGET, ?code, "backend exited");
                self.backend.shutdown();
                self.store.advance_lifecycle(Lifecycle::Terminated);
                vec![FrontEndEvent::Terminated]
            }
        };
        let mut messages = Vec::new();
        self.emit(events, &mut messages);
        messages
    }

    /// Reports whether the client has disconnected.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.disconnected
    }

    /// Session state, for inspection.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Terminates the backend, if any.
    pub fn shutdown(&mut self) {
        if self.backend.shutdown() {
            info!(target: SESSION_TARGET, "backend terminated at session end");
        }
    }

    fn dispatch(&mut self, request: &DapRequest) -> HandlerResult {
        let command = Command::from_str(&request.command).map_err(|_| {
            RequestError::Unsupported {
                command: request.command.clone(),
            }
        })?;
        let name = request.command.as_str();
        let arguments = &request.arguments;
        let mut ctx = Context {
            store: &mut self.store,
            backend: &mut self.backend,
        };
        match command {
            Command::Initialize => lifecycle::initialize(&mut ctx),
            Command::Launch => {
                let env = LaunchEnvironment {
                    launcher: &self.launcher,
                    sink: &self.sink,
                    fallback_backend: self.fallback_backend.as_deref(),
                };
                lifecycle::launch(&mut ctx, &env, &decode_arguments(name, arguments)?)
            }
            Command::ConfigurationDone => Ok(Reply::empty()),
            Command::Disconnect => {
                self.disconnected = true;
                Ok(lifecycle::disconnect(&mut ctx))
            }
            Command::SetBreakpoints => {
                breakpoints::set_breakpoints(&mut ctx, decode_arguments(name, arguments)?)
            }
            Command::SetExceptionBreakpoints => Ok(breakpoints::set_exception_breakpoints(
                &mut ctx,
                &decode_arguments(name, arguments)?,
            )),
            Command::Threads => inspection::threads(),
            Command::StackTrace => {
                inspection::stack_trace(&mut ctx, &decode_arguments(name, arguments)?)
            }
            Command::Scopes => inspection::scopes(),
            Command::Variables => inspection::variables(&mut ctx),
            Command::Evaluate => inspection::evaluate(&mut ctx, &decode_arguments(name, arguments)?),
            Command::ExceptionInfo => inspection::exception_info(&ctx),
            Command::Continue => execution::resume(&mut ctx),
            Command::Next => Ok(execution::next(&mut ctx)),
            Command::StepIn => Ok(execution::step_in(&mut ctx)),
            Command::StepOut => Ok(execution::step_out(&mut ctx)),
        }
    }

    fn emit(&mut self, events: Vec<FrontEndEvent>, messages: &mut Vec<DapMessage>) {
        for event in events {
            if event == FrontEndEvent::Terminated {
                if self.terminated_sent {
                    debug!(target: SESSION_TARGET, "suppressing repeated terminated event");
                    continue;
                }
                self.terminated_sent = true;
            }
            let seq = self.next_seq();
            messages.push(DapMessage::Event(DapEvent::from_front_end(seq, event)));
        }
    }

    const fn next_seq(&mut self) -> i64 {
        self.last_seq += 1;
        self.last_seq
    }
}

impl<L> std::fmt::Debug for DebugSession<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugSession")
            .field("lifecycle", &self.store.lifecycle())
            .field("backend", &self.backend)
            .field("last_seq", &self.last_seq)
            .finish_non_exhaustive()
    }
}
