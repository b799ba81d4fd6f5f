//! Bridge between a Debug Adapter Protocol client and the Scheme compiler's
//! `--debug-json` mode.
//!
//! The client speaks `Content-Length` framed DAP over the adapter's stdio.
//! The backend reads one JSON command per line and writes one JSON event per
//! line, interleaved with ordinary program output. The bridge keeps enough
//! state to answer stack, variable and breakpoint queries that the backend
//! only answers asynchronously.
//!
//! The pieces, leaf first:
//!
//! - [`framer`] splits backend stdout into lines and classifies them.
//! - [`process`] starts, feeds and stops the backend.
//! - [`state`] holds breakpoints, snapshots, location and lifecycle.
//! - [`translate`] maps backend events onto state and client events.
//! - [`session`] dispatches client requests and backend signals.
//! - [`runner`] serialises both input streams into one event loop.

pub mod backend;
pub mod dap;
mod errors;
pub mod events;
pub mod framer;
mod handlers;
pub mod process;
pub mod runner;
pub mod session;
pub mod state;
pub mod translate;

pub use errors::RequestError;
pub use events::{FrontEndEvent, StopReason};
pub use framer::{FramedLine, LineFramer};
pub use process::{
    BackendHandle, BackendLauncher, BackendSignal, LaunchError, LaunchSpec, ProcessLauncher,
    SignalSink,
};
pub use runner::{RunnerError, SessionInput, SessionRunner};
pub use session::DebugSession;
pub use state::{Lifecycle, SessionStore};

#[cfg(test)]
mod tests;
