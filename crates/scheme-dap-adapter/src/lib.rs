//! Process wiring for the `scheme-dap` binary.
//!
//! The binary loads its configuration, installs logging on stderr and then
//! serves one debug session over stdio. Stdout belongs to the protocol
//! stream, so nothing else may write to it.

pub mod bootstrap;
pub mod telemetry;

pub use bootstrap::{AdapterError, ConfigLoader, SystemConfigLoader, serve};
