//! Threads that drain the backend's output streams.

use std::io::{ErrorKind, Read};
use std::process::{ChildStderr, ChildStdout};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use super::lifecycle::wait_for_exit;
use super::state::ProcessState;
use super::{BackendSignal, PROCESS_TARGET, SignalSink};
use crate::framer::LineFramer;

const READ_CHUNK: usize = 8 * 1024;

/// Starts the stdout and stderr readers plus the exit watcher.
///
/// The watcher joins both readers before polling for exit so every output
/// signal is delivered ahead of the single `Exited` signal.
pub(super) fn start(
    pid: u32,
    stdout: ChildStdout,
    stderr: ChildStderr,
    state: Arc<Mutex<ProcessState>>,
    sink: &Arc<dyn SignalSink>,
) -> std::io::Result<()> {
    let stdout_sink = Arc::clone(sink);
    let stdout_reader = thread::Builder::new()
        .name(format!("backend-stdout-{pid}"))
        .spawn(move || pump_stdout(stdout, stdout_sink.as_ref()))?;

    let stderr_sink = Arc::clone(sink);
    let stderr_reader = thread::Builder::new()
        .name(format!("backend-stderr-{pid}"))
        .spawn(move || pump_stderr(stderr, stderr_sink.as_ref()))?;

    let exit_sink = Arc::clone(sink);
    thread::Builder::new()
        .name(format!("backend-exit-{pid}"))
        .spawn(move || {
            join_reader(stdout_reader, pid, "stdout");
            join_reader(stderr_reader, pid, "stderr");
            let code = wait_for_exit(&state, pid);
            if !exit_sink.deliver(BackendSignal::Exited { code }) {
                trace!(target: PROCESS_TARGET, pid, "session gone before exit was reported");
            }
        })?;
    Ok(())
}

fn join_reader(reader: JoinHandle<()>, pid: u32, stream: &'static str) {
    if reader.join().is_err() {
        warn!(target: PROCESS_TARGET, pid, stream, "backend reader thread panicked");
    }
}

/// Frames stdout into lines until end of stream.
pub(super) fn pump_stdout(mut stdout: impl Read, sink: &dyn SignalSink) {
    let mut framer = LineFramer::new();
    let mut buffer = [0_u8; READ_CHUNK];
    loop {
        let read = match stdout.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => {
                warn!(target: PROCESS_TARGET, %error, "failed to read backend stdout");
                break;
            }
        };
        for line in framer.feed(buffer.get(..read).unwrap_or_default()) {
            if !sink.deliver(BackendSignal::Line(line)) {
                return;
            }
        }
    }
    if let Some(line) = framer.finish() {
        sink.deliver(BackendSignal::Line(line));
    }
    debug!(target: PROCESS_TARGET, "backend stdout closed");
}

/// Forwards stderr text until end of stream.
///
/// Chunks are not line-framed, but a UTF-8 sequence split across two reads
/// is held back until it is complete.
pub(super) fn pump_stderr(mut stderr: impl Read, sink: &dyn SignalSink) {
    let mut pending = Vec::new();
    let mut buffer = [0_u8; READ_CHUNK];
    loop {
        let read = match stderr.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => {
                warn!(target: PROCESS_TARGET, %error, "failed to read backend stderr");
                break;
            }
        };
        pending.extend_from_slice(buffer.get(..read).unwrap_or_default());
        let text = take_complete_text(&mut pending);
        if !text.is_empty() && !sink.deliver(BackendSignal::Stderr(text)) {
            return;
        }
    }
    if !pending.is_empty() {
        sink.deliver(BackendSignal::Stderr(
            String::from_utf8_lossy(&pending).into_owned(),
        ));
    }
    debug!(target: PROCESS_TARGET, "backend stderr closed");
}

/// Decodes everything in `pending` except an incomplete trailing UTF-8
/// sequence, which stays buffered. Invalid bytes become U+FFFD.
fn take_complete_text(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    loop {
        let error = match std::str::from_utf8(pending) {
            Ok(valid) => {
                text.push_str(valid);
                pending.clear();
                return text;
            }
            Err(error) => error,
        };
        let valid_up_to = error.valid_up_to();
        text.push_str(&String::from_utf8_lossy(
            pending.get(..valid_up_to).unwrap_or_default(),
        ));
        let Some(invalid_len) = error.error_len() else {
            pending.drain(..valid_up_to);
            return text;
        };
        text.push(char::REPLACEMENT_CHARACTER);
        pending.drain(..valid_up_to + invalid_len);
    }
}
