//! Exit detection and forced termination of the backend process.

use std::process::Child;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::PROCESS_TARGET;
use super::state::{ProcessState, lock};

/// Interval between `try_wait` polls.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time the backend is given to honour `quit` before it is killed.
const QUIT_GRACE_PERIOD: Duration = Duration::from_millis(200);

/// Blocks until the process has exited and returns its exit code.
///
/// The state lock is released between polls so [`terminate_child`] can run
/// concurrently from the session thread.
pub(super) fn wait_for_exit(state: &Mutex<ProcessState>, pid: u32) -> Option<i32> {
    loop {
        let mut guard = lock(state);
        let polled = match &mut *guard {
            ProcessState::Stopped { code } => return *code,
            ProcessState::Running { child } => child.try_wait(),
        };
        match polled {
            Ok(Some(status)) => {
                debug!(target: PROCESS_TARGET, pid, ?status, "backend process exited");
                let code = status.code();
                *guard = ProcessState::Stopped { code };
                return code;
            }
            Ok(None) => {}
            Err(error) => {
                warn!(
                    target: PROCESS_TARGET,
                    pid,
                    %error,
                    "failed to poll backend process, killing it"
                );
                let previous = std::mem::replace(&mut *guard, ProcessState::Stopped { code: None });
                if let ProcessState::Running { mut child } = previous {
                    let code = kill_and_reap(&mut child, pid);
                    *guard = ProcessState::Stopped { code };
                    return code;
                }
                return None;
            }
        }
        drop(guard);
        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

/// Waits briefly for the child to exit on its own, then kills it.
///
/// Returns the exit code once the child has been reaped.
pub(super) fn terminate_child(child: &mut Child, pid: u32) -> Option<i32> {
    let deadline = Instant::now() + QUIT_GRACE_PERIOD;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(target: PROCESS_TARGET, pid, ?status, "backend exited after quit");
                return status.code();
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL_INTERVAL),
            Ok(None) => {
                warn!(
                    target: PROCESS_TARGET,
                    pid,
                    "backend did not exit after quit, killing it"
                );
                return kill_and_reap(child, pid);
            }
            Err(error) => {
                warn!(
                    target: PROCESS_TARGET,
                    pid,
                    %error,
                    "failed to check backend status, killing it"
                );
                return kill_and_reap(child, pid);
            }
        }
    }
}

fn kill_and_reap(child: &mut Child, pid: u32) -> Option<i32> {
    if let Err(error) = child.kill() {
        debug!(target: PROCESS_TARGET, pid, %error, "kill failed; process may have exited");
    }
    match child.wait() {
        Ok(status) => status.code(),
        Err(error) => {
            warn!(target: PROCESS_TARGET, pid, %error, "failed to reap backend process");
            None
        }
    }
}
