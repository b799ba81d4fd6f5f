//! Wire types for the compiler's `--debug-json` protocol.
//!
//! The backend reads one JSON command object per line on stdin and writes
//! one JSON event object per line on stdout. Anything else it prints (program
//! output, diagnostics, protocol responses) is passed through as text.

mod command;
mod event;

pub use command::{BackendCommand, CatchMode};
pub use event::{
    BackendEvent, OutputPayload, StackEntry, StackPayload, StopPayload, VariableEntry,
    VariablesPayload, WatchEntry, WatchPayload,
};
