//! Events read from the backend's stdout.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Location and reason fields shared by the three stop events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StopPayload {
    /// One-based line of the stop, when reported.
    pub line: Option<u32>,
    /// Source file of the stop, when reported.
    pub file: Option<String>,
    /// Free-form stop reason such as `step` or `exception`.
    pub reason: Option<String>,
    /// Exception message attached to exception stops.
    pub message: Option<String>,
}

/// Program or backend output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputPayload {
    /// Output text, emitted verbatim.
    pub text: Option<String>,
    /// Output category such as `stdout` or `stderr`.
    pub category: Option<String>,
}

/// A frame in a `stack` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StackEntry {
    /// Procedure name.
    #[serde(default)]
    pub name: String,
    /// Source file of the frame.
    #[serde(default)]
    pub file: String,
    /// One-based line within `file`.
    #[serde(default = "first_line")]
    pub line: u32,
}

const fn first_line() -> u32 {
    1
}

/// Call stack snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StackPayload {
    /// Frames, innermost first. Absent means an empty stack.
    pub frames: Option<Vec<StackEntry>>,
}

/// A binding in a `variables` snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariableEntry {
    /// Variable name.
    pub name: String,
    /// Opaque value; strings are shown raw, everything else as JSON.
    #[serde(default)]
    pub value: Value,
}

/// Local variable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VariablesPayload {
    /// Bindings; absent leaves the cached snapshot untouched.
    pub variables: Option<Vec<VariableEntry>>,
}

/// A watch expression and its latest value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchEntry {
    /// Watch identifier.
    pub id: u64,
    /// Watched expression.
    pub expression: String,
    /// Latest value, if the backend could evaluate it.
    #[serde(default)]
    pub value: Option<String>,
}

/// Watch list snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchPayload {
    /// Watches; absent leaves the cached list untouched.
    pub watches: Option<Vec<WatchEntry>>,
}

/// A structured event decoded from one backend line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum BackendEvent {
    /// Execution paused after a step.
    Paused(StopPayload),
    /// Execution hit a breakpoint.
    Breakpoint(StopPayload),
    /// Execution stopped for another reason, exceptions included.
    Stopped(StopPayload),
    /// The debuggee finished.
    Terminated,
    /// Output produced by the debuggee.
    Output(OutputPayload),
    /// Reply to `backtrace`.
    Stack(StackPayload),
    /// Reply to `locals`.
    Variables(VariablesPayload),
    /// Updated watch values.
    Watch(WatchPayload),
    /// Any other event tag.
    #[serde(other)]
    Unrecognized,
}

impl BackendEvent {
    /// Decodes one protocol line.
    ///
    /// Fields nested under a `body` object are lifted to the top level
    /// before decoding; a top-level field of the same name wins.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` when the line is not a JSON object with
    /// a string `event` tag, or when a known field has the wrong type.
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        let mut fields: Map<String, Value> = serde_json::from_str(line)?;
        if let Some(Value::Object(body)) = fields.remove("body") {
            for (key, value) in body {
                fields.entry(key).or_insert(value);
            }
        }
        Self::deserialize(Value::Object(fields))
    }
}
