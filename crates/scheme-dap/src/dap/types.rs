//! Typed arguments and response bodies for the requests the adapter serves.
//!
//! Only the fields the bridge reads or writes are modelled. Unknown argument
//! fields are ignored.

use serde::{Deserialize, Serialize};

/// `launch` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchArguments {
    /// Scheme source file to debug.
    pub program: Option<String>,
    /// Compiler executable to run in debug mode.
    pub compiler_path: Option<String>,
    /// Stop on the first expression instead of running to a breakpoint.
    pub stop_on_entry: bool,
}

/// A client source reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Source {
    /// Display name, usually the file's basename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Path on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Source {
    /// Builds a source from a path, naming it after the path's last
    /// component.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let name = std::path::Path::new(path)
            .file_name()
            .map_or_else(|| path.to_owned(), |name| name.to_string_lossy().into_owned());
        Self {
            name: Some(name),
            path: Some(path.to_owned()),
        }
    }
}

/// A breakpoint as requested by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceBreakpoint {
    /// One-based line.
    pub line: u32,
    /// Optional condition expression.
    #[serde(default)]
    pub condition: Option<String>,
}

/// `setBreakpoints` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SetBreakpointsArguments {
    /// File the breakpoints belong to.
    pub source: Source,
    /// Full list of breakpoints for the file.
    pub breakpoints: Vec<SourceBreakpoint>,
}

/// `setExceptionBreakpoints` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SetExceptionBreakpointsArguments {
    /// Selected filter ids.
    pub filters: Vec<String>,
}

/// `stackTrace` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackTraceArguments {
    /// Index of the first frame to return.
    pub start_frame: Option<usize>,
    /// Maximum number of frames; zero or absent means all.
    pub levels: Option<usize>,
}

/// `evaluate` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvaluateArguments {
    /// Expression to evaluate.
    pub expression: String,
    /// Where the request comes from: `watch`, `hover`, `repl`, ...
    pub context: Option<String>,
}

/// An exception filter offered to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionBreakpointsFilter {
    /// Filter id sent back in `setExceptionBreakpoints`.
    pub filter: &'static str,
    /// Label shown by the client.
    pub label: &'static str,
    /// Whether the filter starts enabled.
    pub default: bool,
}

/// Adapter capabilities returned from `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[expect(
    clippy::struct_excessive_bools,
    reason = "capabilities are a flat set of protocol flags"
)]
pub struct Capabilities {
    /// Supports `configurationDone`.
    pub supports_configuration_done_request: bool,
    /// Supports `evaluate` for hovers.
    pub supports_evaluate_for_hovers: bool,
    /// Supports breakpoint conditions.
    pub supports_conditional_breakpoints: bool,
    /// Supports hit-count conditions.
    pub supports_hit_conditional_breakpoints: bool,
    /// Supports `setVariable`.
    pub supports_set_variable: bool,
    /// Supports reverse execution.
    pub supports_step_back: bool,
    /// Supports `restartFrame`.
    pub supports_restart_frame: bool,
    /// Supports `gotoTargets`.
    pub supports_goto_targets_request: bool,
    /// Supports `stepInTargets`.
    pub supports_step_in_targets_request: bool,
    /// Supports `completions`.
    pub supports_completions_request: bool,
    /// Supports `exceptionInfo`.
    pub supports_exception_info_request: bool,
    /// Supports exception options.
    pub supports_exception_options: bool,
    /// Supports `breakpointLocations`.
    pub supports_breakpoint_locations_request: bool,
    /// Exception filters offered to the client.
    pub exception_breakpoint_filters: Vec<ExceptionBreakpointsFilter>,
}

impl Capabilities {
    /// The capabilities of this adapter.
    #[must_use]
    pub fn scheme() -> Self {
        Self {
            supports_configuration_done_request: true,
            supports_evaluate_for_hovers: true,
            supports_conditional_breakpoints: true,
            supports_hit_conditional_breakpoints: false,
            supports_set_variable: false,
            supports_step_back: false,
            supports_restart_frame: false,
            supports_goto_targets_request: false,
            supports_step_in_targets_request: false,
            supports_completions_request: false,
            supports_exception_info_request: true,
            supports_exception_options: true,
            supports_breakpoint_locations_request: false,
            exception_breakpoint_filters: vec![
                ExceptionBreakpointsFilter {
                    filter: "all",
                    label: "All Exceptions",
                    default: false,
                },
                ExceptionBreakpointsFilter {
                    filter: "uncaught",
                    label: "Uncaught Exceptions",
                    default: true,
                },
            ],
        }
    }
}

/// A breakpoint reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakpointBody {
    /// Adapter-assigned id.
    pub id: u64,
    /// Whether the breakpoint is considered installed.
    pub verified: bool,
    /// One-based line.
    pub line: u32,
    /// File of the breakpoint.
    pub source: Source,
}

/// `setBreakpoints` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetBreakpointsBody {
    /// One entry per requested breakpoint, in request order.
    pub breakpoints: Vec<BreakpointBody>,
}

/// A thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    /// Thread id.
    pub id: i64,
    /// Display name.
    pub name: &'static str,
}

/// `threads` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadsBody {
    /// All threads.
    pub threads: Vec<Thread>,
}

/// A stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    /// Frame id, its index in the full trace.
    pub id: usize,
    /// Procedure name.
    pub name: String,
    /// Source of the frame.
    pub source: Source,
    /// One-based line.
    pub line: u32,
    /// One-based column; the backend reports lines only.
    pub column: u32,
}

/// `stackTrace` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceBody {
    /// Requested window of frames.
    pub stack_frames: Vec<StackFrame>,
    /// Number of frames in the full trace.
    pub total_frames: usize,
}

/// A variable scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Display name.
    pub name: &'static str,
    /// Reference used by `variables`.
    pub variables_reference: i64,
    /// Whether fetching the scope is costly.
    pub expensive: bool,
}

/// `scopes` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopesBody {
    /// Available scopes.
    pub scopes: Vec<Scope>,
}

/// A variable shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Rendered value.
    pub value: String,
    /// Always zero: values are not expandable.
    pub variables_reference: i64,
}

/// `variables` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariablesBody {
    /// Cached variables.
    pub variables: Vec<Variable>,
}

/// `evaluate` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBody {
    /// Rendered result.
    pub result: String,
    /// Always zero: results are not expandable.
    pub variables_reference: i64,
}

/// `continue` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueBody {
    /// Always `true`: there is one thread.
    pub all_threads_continued: bool,
}

/// `exceptionInfo` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionInfoBody {
    /// Exception identifier.
    pub exception_id: &'static str,
    /// Exception message.
    pub description: String,
    /// When the client asked to break on exceptions.
    pub break_mode: &'static str,
}
