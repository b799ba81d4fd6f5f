//! Commands written to the backend's stdin.

use serde::{Deserialize, Serialize};

/// Exception catching mode understood by the backend `catch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatchMode {
    /// Break on every raised exception.
    All,
    /// Break only on exceptions that no handler catches.
    Uncaught,
    /// Never break on exceptions.
    #[serde(rename = "none")]
    Disabled,
}

/// One command line sent to the backend.
///
/// Serialises as a JSON object tagged by `command`, e.g.
/// `{"command":"break","file":"main.scm","line":3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum BackendCommand {
    /// Installs a breakpoint.
    Break {
        /// Source file path as reported by the client.
        file: String,
        /// One-based line number.
        line: u32,
        /// Optional condition expression.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },
    /// Removes a previously installed breakpoint.
    Delete {
        /// Identifier assigned when the breakpoint was installed.
        breakpoint: u64,
    },
    /// Changes the exception catching mode.
    Catch {
        /// New catching mode.
        mode: CatchMode,
    },
    /// Resumes execution.
    Continue,
    /// Steps over the current expression.
    Next,
    /// Steps into the current expression.
    Step,
    /// Runs until the current frame returns.
    Finish,
    /// Requests a `stack` event.
    Backtrace,
    /// Requests a `variables` event.
    Locals,
    /// Evaluates an expression in the paused frame.
    Print {
        /// Expression source text.
        expression: String,
    },
    /// Asks the backend to exit.
    Quit,
}

impl BackendCommand {
    /// Returns the wire name of the command, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Break { .. } => "break",
            Self::Delete { .. } => "delete",
            Self::Catch { .. } => "catch",
            Self::Continue => "continue",
            Self::Next => "next",
            Self::Step => "step",
            Self::Finish => "finish",
            Self::Backtrace => "backtrace",
            Self::Locals => "locals",
            Self::Print { .. } => "print",
            Self::Quit => "quit",
        }
    }

    /// Encodes the command as a single newline-terminated JSON line.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialisation fails.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    fn encoded(command: &BackendCommand) -> Value {
        let line = command.to_line().expect("command should encode");
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1, "exactly one line per command");
        serde_json::from_str(line.trim_end()).expect("line should be JSON")
    }

    #[rstest]
    #[case(BackendCommand::Continue, json!({"command": "continue"}))]
    #[case(BackendCommand::Finish, json!({"command": "finish"}))]
    #[case(BackendCommand::Delete { breakpoint: 7 }, json!({"command": "delete", "breakpoint": 7}))]
    #[case(
        BackendCommand::Catch { mode: CatchMode::Disabled },
        json!({"command": "catch", "mode": "none"})
    )]
    #[case(
        BackendCommand::Print { expression: String::from("(car xs)") },
        json!({"command": "print", "expression": "(car xs)"})
    )]
    fn commands_use_backend_wire_names(#[case] command: BackendCommand, #[case] expected: Value) {
        assert_eq!(encoded(&command), expected);
        assert_eq!(expected.get("command"), Some(&json!(command.name())));
    }

    #[rstest]
    fn break_omits_missing_condition() {
        let command = BackendCommand::Break {
            file: String::from("/src/main.scm"),
            line: 4,
            condition: None,
        };
        assert_eq!(
            encoded(&command),
            json!({"command": "break", "file": "/src/main.scm", "line": 4})
        );
    }

    #[rstest]
    fn break_carries_condition() {
        let command = BackendCommand::Break {
            file: String::from("a.scm"),
            line: 9,
            condition: Some(String::from("(> n 3)")),
        };
        assert_eq!(
            encoded(&command).get("condition"),
            Some(&json!("(> n 3)"))
        );
    }
}
