//! Debug Adapter Protocol plumbing: envelopes, typed payloads and the
//! `Content-Length` framed transport.

mod protocol;
mod transport;
pub mod types;

pub(crate) use protocol::THREAD_ID;
pub use protocol::{DapEvent, DapMessage, DapRequest, DapResponse};
pub use transport::{MessageReader, MessageWriter, TransportError};
