//! Runs real child processes standing in for the compiler's debug mode.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

use scheme_dap::backend::{BackendCommand, BackendEvent};
use scheme_dap::dap::DapRequest;
use scheme_dap::process::{BackendHandle, ProcessBackend};
use scheme_dap::{BackendSignal, DebugSession, FramedLine, LaunchSpec, ProcessLauncher};

const SIGNAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Announces a stop, logs each command to `commands.log` in its working
/// directory, and finishes with exit code 3 after `continue`.
const SCRIPTED_BACKEND: &str = r#"#!/bin/sh
echo '{"event":"paused","file":"main.scm","line":1}'
while IFS= read -r line; do
  printf '%s\n' "$line" >> commands.log
  case "$line" in
    *'"continue"'*)
      echo 'compiled main.scm'
      echo 'warning: unused binding' >&2
      echo '{"event":"terminated"}'
      exit 3
      ;;
  esac
done
"#;

/// Ignores every command.
const STUBBORN_BACKEND: &str = "#!/bin/sh\nexec sleep 30\n";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, body).expect("write backend script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("make backend script executable");
        path
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn command_log(&self) -> String {
        fs::read_to_string(self.path().join("commands.log")).unwrap_or_default()
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace {
        dir: TempDir::new().expect("create temporary directory"),
    }
}

fn collect_until_exit(receiver: &mpsc::Receiver<BackendSignal>) -> Vec<BackendSignal> {
    let mut signals = Vec::new();
    loop {
        let signal = receiver
            .recv_timeout(SIGNAL_TIMEOUT)
            .expect("backend should signal before the timeout");
        let exited = matches!(signal, BackendSignal::Exited { .. });
        signals.push(signal);
        if exited {
            return signals;
        }
    }
}

#[rstest]
fn backend_output_arrives_in_order_then_exit(workspace: Workspace) {
    let script = workspace.script("backend.sh", SCRIPTED_BACKEND);
    let (sender, receiver) = mpsc::channel();
    let sink: Arc<dyn scheme_dap::SignalSink> = Arc::new(sender);
    let spec = LaunchSpec::new(script)
        .with_args(["--debug-json", "main.scm"])
        .with_working_dir(workspace.path());

    let mut backend = ProcessBackend::spawn(&spec, &sink).expect("backend should start");
    let first = receiver
        .recv_timeout(SIGNAL_TIMEOUT)
        .expect("backend should announce a stop");
    assert!(matches!(
        first,
        BackendSignal::Line(FramedLine::Event(BackendEvent::Paused(ref stop)))
            if stop.line == Some(1)
    ));

    backend
        .send(&BackendCommand::Continue)
        .expect("continue should be written");
    let signals = collect_until_exit(&receiver);

    let lines: Vec<&FramedLine> = signals
        .iter()
        .filter_map(|signal| match signal {
            BackendSignal::Line(line) => Some(line),
            _ => None,
        })
        .collect();
    assert_eq!(
        lines,
        vec![
            &FramedLine::Text(String::from("compiled main.scm")),
            &FramedLine::Event(BackendEvent::Terminated),
        ]
    );
    let stderr: String = signals
        .iter()
        .filter_map(|signal| match signal {
            BackendSignal::Stderr(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(stderr, "warning: unused binding\n");
    assert_eq!(signals.last(), Some(&BackendSignal::Exited { code: Some(3) }));
    assert_eq!(workspace.command_log(), "{\"command\":\"continue\"}\n");
}

#[rstest]
fn terminate_kills_a_backend_that_ignores_quit(workspace: Workspace) {
    let script = workspace.script("stubborn.sh", STUBBORN_BACKEND);
    let (sender, receiver) = mpsc::channel();
    let sink: Arc<dyn scheme_dap::SignalSink> = Arc::new(sender);

    let mut backend =
        ProcessBackend::spawn(&LaunchSpec::new(script), &sink).expect("backend should start");
    assert!(!backend.is_terminated());
    backend.terminate();
    assert!(backend.is_terminated());

    let signals = collect_until_exit(&receiver);
    assert_eq!(signals.last(), Some(&BackendSignal::Exited { code: None }));
    assert!(backend.send(&BackendCommand::Continue).is_err());
}

#[rstest]
fn missing_backend_fails_to_launch(workspace: Workspace) {
    let (sender, _receiver) = mpsc::channel();
    let sink: Arc<dyn scheme_dap::SignalSink> = Arc::new(sender);
    let spec = LaunchSpec::new(workspace.path().join("no-such-compiler"));

    let error = ProcessBackend::spawn(&spec, &sink).expect_err("spawn should fail");
    assert!(error.to_string().contains("no-such-compiler"));
}

#[rstest]
fn session_reports_a_real_run_once(workspace: Workspace) {
    let script = workspace.script("backend.sh", SCRIPTED_BACKEND);
    let program = workspace.path().join("main.scm");
    fs::write(&program, "(display \"hi\")\n").expect("write program");
    let (sender, receiver) = mpsc::channel();
    let mut session = DebugSession::new(ProcessLauncher, Arc::new(sender));

    let mut messages = session.handle_request(&DapRequest::new(1, "initialize", Value::Null));
    messages.extend(session.handle_request(&DapRequest::new(
        2,
        "launch",
        json!({
            "program": program.to_string_lossy(),
            "compilerPath": script.to_string_lossy(),
        }),
    )));
    loop {
        let signal = receiver
            .recv_timeout(SIGNAL_TIMEOUT)
            .expect("backend should signal before the timeout");
        let exited = matches!(signal, BackendSignal::Exited { .. });
        messages.extend(session.handle_signal(signal));
        if exited {
            break;
        }
    }

    let encoded: Vec<Value> = messages
        .iter()
        .map(|message| serde_json::to_value(message).expect("message should encode"))
        .collect();
    let events: Vec<&str> = encoded
        .iter()
        .filter_map(|message| message.get("event").and_then(Value::as_str))
        .collect();
    assert_eq!(
        events.iter().filter(|event| **event == "terminated").count(),
        1
    );
    assert!(events.contains(&"stopped"));
    assert!(encoded.iter().any(|message| {
        message.pointer("/body/output") == Some(&json!("compiled main.scm\n"))
    }));
    assert_eq!(workspace.command_log(), "{\"command\":\"continue\"}\n");
}
