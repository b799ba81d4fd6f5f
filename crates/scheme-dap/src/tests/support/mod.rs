//! Shared fixtures and helpers for session tests.

mod recording_backend;
mod world;

use std::sync::Arc;

use serde_json::{Value, json};

use crate::dap::{DapMessage, DapRequest};
use crate::process::{BackendSignal, SignalSink};

pub use recording_backend::{RecordingLauncher, RecordingObserver};
pub use world::SessionWorld;

/// Program path used by launch helpers.
pub const PROGRAM: &str = "/work/demo/main.scm";

/// Backend path used by launch helpers.
pub const BACKEND: &str = "/opt/scheme/bin/schemec";

/// Sink for sessions whose signals are injected by hand.
pub struct DiscardSink;

impl SignalSink for DiscardSink {
    fn deliver(&self, _signal: BackendSignal) -> bool {
        true
    }
}

/// Returns a sink that drops everything.
pub fn discard_sink() -> Arc<dyn SignalSink> {
    Arc::new(DiscardSink)
}

/// Builds a client request.
pub fn request(seq: i64, command: &str, arguments: Value) -> DapRequest {
    DapRequest::new(seq, command, arguments)
}

/// Launch arguments for [`PROGRAM`] run by [`BACKEND`].
pub fn launch_arguments(stop_on_entry: bool) -> Value {
    json!({
        "program": PROGRAM,
        "compilerPath": BACKEND,
        "stopOnEntry": stop_on_entry,
    })
}

/// Encodes outgoing messages as JSON for assertions.
pub fn encode(messages: &[DapMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| serde_json::to_value(message).expect("message should encode"))
        .collect()
}

/// Keeps only the events named `name`.
pub fn events_named<'a>(messages: &'a [Value], name: &str) -> Vec<&'a Value> {
    messages
        .iter()
        .filter(|message| {
            message.get("type") == Some(&json!("event")) && message.get("event") == Some(&json!(name))
        })
        .collect()
}
