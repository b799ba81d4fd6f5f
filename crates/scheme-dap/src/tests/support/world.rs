//! A session under test plus the helpers scenarios and unit tests share.

use serde_json::{Value, json};

use super::{RecordingLauncher, RecordingObserver, discard_sink, encode, launch_arguments, request};
use crate::framer::LineFramer;
use crate::process::BackendSignal;
use crate::session::DebugSession;

/// Drives a [`DebugSession`] backed by a [`RecordingLauncher`].
pub struct SessionWorld {
    session: DebugSession<RecordingLauncher>,
    observer: RecordingObserver,
    last_seq: i64,
    last: Vec<Value>,
    /// Breakpoint ids returned by earlier `setBreakpoints` calls.
    pub earlier_ids: Vec<u64>,
}

impl Default for SessionWorld {
    fn default() -> Self {
        Self::with_launcher(RecordingLauncher::new())
    }
}

impl SessionWorld {
    /// Creates a world around `launcher`.
    pub fn with_launcher(launcher: RecordingLauncher) -> Self {
        let observer = launcher.observer();
        Self {
            session: DebugSession::new(launcher, discard_sink()),
            observer,
            last_seq: 0,
            last: Vec::new(),
            earlier_ids: Vec::new(),
        }
    }

    /// Creates a world whose session falls back to `backend` when a launch
    /// request names no compiler.
    pub fn with_fallback_backend(launcher: RecordingLauncher, backend: &str) -> Self {
        let observer = launcher.observer();
        Self {
            session: DebugSession::new(launcher, discard_sink())
                .with_fallback_backend(Some(backend.to_owned())),
            observer,
            last_seq: 0,
            last: Vec::new(),
            earlier_ids: Vec::new(),
        }
    }

    /// Sends one request and records the resulting messages.
    pub fn send(&mut self, command: &str, arguments: Value) -> Vec<Value> {
        self.last_seq += 1;
        let messages = self
            .session
            .handle_request(&request(self.last_seq, command, arguments));
        self.last = encode(&messages);
        self.last.clone()
    }

    /// Delivers one backend signal and records the resulting messages.
    pub fn signal(&mut self, signal: BackendSignal) -> Vec<Value> {
        let messages = self.session.handle_signal(signal);
        self.last = encode(&messages);
        self.last.clone()
    }

    /// Frames `line` as backend stdout and delivers every resulting signal.
    pub fn backend_line(&mut self, line: &str) -> Vec<Value> {
        let mut framer = LineFramer::new();
        let framed: Vec<_> = framer.feed(format!("{line}\n").as_bytes()).collect();
        let mut produced = Vec::new();
        for item in framed {
            produced.extend(self.signal(BackendSignal::Line(item)));
        }
        self.last.clone_from(&produced);
        produced
    }

    /// Runs `initialize` then a successful `launch`, forgetting the commands
    /// the launch queued.
    pub fn launched(&mut self) -> &mut Self {
        self.send("initialize", json!({"adapterID": "scheme"}));
        self.send("launch", launch_arguments(false));
        self.observer.clear_commands();
        self
    }

    /// The first response among the last messages.
    pub fn response(&self) -> &Value {
        self.last
            .iter()
            .find(|message| message.get("type") == Some(&json!("response")))
            .expect("a response should have been produced")
    }

    /// The session under test.
    pub const fn session(&self) -> &DebugSession<RecordingLauncher> {
        &self.session
    }

    /// What the recording backend saw.
    pub const fn observer(&self) -> &RecordingObserver {
        &self.observer
    }
}
