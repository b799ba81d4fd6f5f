//! Request, response and event envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::events::FrontEndEvent;

/// Thread id of the single thread the backend exposes.
pub(crate) const THREAD_ID: i64 = 1;

/// A request from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DapRequest {
    /// Client sequence number, echoed as `request_seq`.
    pub seq: i64,
    /// Always `request`.
    #[serde(rename = "type", default = "request_type")]
    pub kind: String,
    /// Request name, e.g. `setBreakpoints`.
    pub command: String,
    /// Request-specific arguments.
    #[serde(default)]
    pub arguments: Value,
}

fn request_type() -> String {
    String::from("request")
}

impl DapRequest {
    /// Builds a request; used by clients and tests.
    pub fn new(seq: i64, command: impl Into<String>, arguments: Value) -> Self {
        Self {
            seq,
            kind: request_type(),
            command: command.into(),
            arguments,
        }
    }
}

/// A response to a [`DapRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DapResponse {
    /// Adapter sequence number.
    pub seq: i64,
    /// Always `response`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Sequence number of the request being answered.
    pub request_seq: i64,
    /// Whether the request succeeded.
    pub success: bool,
    /// Name of the request being answered.
    pub command: String,
    /// Error text for failed requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl DapResponse {
    /// Builds a successful response.
    #[must_use]
    pub fn success(seq: i64, request: &DapRequest, body: Option<Value>) -> Self {
        Self {
            seq,
            kind: "response",
            request_seq: request.seq,
            success: true,
            command: request.command.clone(),
            message: None,
            body,
        }
    }

    /// Builds a failed response carrying `message`.
    #[must_use]
    pub fn failure(seq: i64, request: &DapRequest, message: String) -> Self {
        Self {
            seq,
            kind: "response",
            request_seq: request.seq,
            success: false,
            command: request.command.clone(),
            message: Some(message),
            body: None,
        }
    }
}

/// An event pushed to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DapEvent {
    /// Adapter sequence number.
    pub seq: i64,
    /// Always `event`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Event name.
    pub event: &'static str,
    /// Event payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl DapEvent {
    /// Encodes a [`FrontEndEvent`] with the given sequence number.
    #[must_use]
    pub fn from_front_end(seq: i64, event: FrontEndEvent) -> Self {
        let name = event.name();
        let body = match event {
            FrontEndEvent::Initialized | FrontEndEvent::Terminated => None,
            FrontEndEvent::Stopped { reason, text } => {
                let mut body = json!({
                    "reason": reason.as_str(),
                    "threadId": THREAD_ID,
                    "allThreadsStopped": true,
                });
                if let (Some(message), Value::Object(fields)) = (text, &mut body) {
                    fields.insert(String::from("text"), Value::String(message));
                }
                Some(body)
            }
            FrontEndEvent::Output { category, output } => Some(json!({
                "category": category,
                "output": output,
            })),
        };
        Self {
            seq,
            kind: "event",
            event: name,
            body,
        }
    }
}

/// Anything the adapter writes to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DapMessage {
    /// A response.
    Response(DapResponse),
    /// An event.
    Event(DapEvent),
}
