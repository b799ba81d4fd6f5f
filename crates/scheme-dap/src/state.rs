//! Mutable state of one debug session.
//!
//! The store answers the client's synchronous queries from the last
//! asynchronous snapshots the backend sent. It performs no I/O; the session
//! runner guarantees a single writer.

use std::collections::BTreeMap;

use serde_json::Value;

/// A breakpoint the bridge has asked the backend to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Session-unique identifier; never reused.
    pub id: u64,
    /// Source file path as given by the client.
    pub file: String,
    /// One-based line.
    pub line: u32,
    /// Always `true`; the backend is trusted to honour every request.
    pub verified: bool,
    /// Non-empty condition expression.
    pub condition: Option<String>,
}

/// A breakpoint requested by the client, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRequest {
    /// One-based line.
    pub line: u32,
    /// Condition expression; blank conditions are dropped.
    pub condition: Option<String>,
}

/// Result of replacing the breakpoints of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointReplacement {
    /// Breakpoints that were installed before the call.
    pub removed: Vec<Breakpoint>,
    /// Breakpoints installed by the call, with fresh ids.
    pub installed: Vec<Breakpoint>,
}

/// A watch expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watch {
    /// Watch identifier.
    pub id: u64,
    /// Watched expression.
    pub expression: String,
    /// Latest value reported by the backend.
    pub value: Option<String>,
}

/// A frame from the last stack snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFrame {
    /// Procedure name.
    pub name: String,
    /// Source file.
    pub file: String,
    /// One-based line.
    pub line: u32,
}

/// When the backend should break on exceptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExceptionBreakMode {
    /// Never break.
    #[default]
    Never,
    /// Break on every exception.
    Always,
    /// Break on exceptions no handler catches.
    Uncaught,
}

impl ExceptionBreakMode {
    /// Name used for `breakMode` in exception info responses.
    #[must_use]
    pub const fn break_mode(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Always => "always",
            Self::Uncaught => "unhandled",
        }
    }
}

/// Session lifecycle. Only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    /// No `initialize` yet.
    #[default]
    Uninitialized,
    /// Capabilities exchanged.
    Initialized,
    /// A backend has been started.
    Launched,
    /// The session is over.
    Terminated,
}

impl Lifecycle {
    /// Lower-case name for messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Launched => "launched",
            Self::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All mutable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStore {
    breakpoints: BTreeMap<String, Vec<Breakpoint>>,
    last_breakpoint_id: u64,
    watches: Vec<Watch>,
    last_watch_id: u64,
    stack: Vec<CachedFrame>,
    variables: Vec<(String, Value)>,
    current_file: String,
    current_line: u32,
    exception_mode: ExceptionBreakMode,
    lifecycle: Lifecycle,
    last_exception: Option<String>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates the state of a fresh session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            breakpoints: BTreeMap::new(),
            last_breakpoint_id: 0,
            watches: Vec::new(),
            last_watch_id: 0,
            stack: Vec::new(),
            variables: Vec::new(),
            current_file: String::new(),
            current_line: 1,
            exception_mode: ExceptionBreakMode::Never,
            lifecycle: Lifecycle::Uninitialized,
            last_exception: None,
        }
    }

    /// Replaces every breakpoint of `file`, assigning fresh ids.
    pub fn replace_breakpoints<I>(&mut self, file: &str, requested: I) -> BreakpointReplacement
    where
        I: IntoIterator<Item = BreakpointRequest>,
    {
        let removed = self.breakpoints.remove(file).unwrap_or_default();
        let installed: Vec<Breakpoint> = requested
            .into_iter()
            .map(|request| {
                self.last_breakpoint_id += 1;
                Breakpoint {
                    id: self.last_breakpoint_id,
                    file: file.to_owned(),
                    line: request.line,
                    verified: true,
                    condition: request.condition.filter(|text| !text.trim().is_empty()),
                }
            })
            .collect();
        if !installed.is_empty() {
            self.breakpoints.insert(file.to_owned(), installed.clone());
        }
        BreakpointReplacement { removed, installed }
    }

    /// Every installed breakpoint, grouped by file.
    pub fn all_breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values().flatten()
    }

    /// Breakpoints currently installed in `file`.
    #[must_use]
    pub fn breakpoints_for(&self, file: &str) -> &[Breakpoint] {
        self.breakpoints.get(file).map_or(&[], Vec::as_slice)
    }

    /// Registers a watch expression and returns its id.
    ///
    /// An expression that is already watched keeps its existing id.
    pub fn add_watch(&mut self, expression: &str) -> u64 {
        if let Some(existing) = self.watches.iter().find(|w| w.expression == expression) {
            return existing.id;
        }
        self.last_watch_id += 1;
        self.watches.push(Watch {
            id: self.last_watch_id,
            expression: expression.to_owned(),
            value: None,
        });
        self.last_watch_id
    }

    /// Removes every watch.
    pub fn clear_watches(&mut self) {
        self.watches.clear();
    }

    /// Replaces the watch list with the backend's latest report.
    pub fn replace_watches(&mut self, watches: Vec<Watch>) {
        if let Some(highest) = watches.iter().map(|w| w.id).max() {
            self.last_watch_id = self.last_watch_id.max(highest);
        }
        self.watches = watches;
    }

    /// Current watches.
    #[must_use]
    pub fn watches(&self) -> &[Watch] {
        &self.watches
    }

    /// Replaces the cached stack.
    pub fn replace_stack(&mut self, frames: Vec<CachedFrame>) {
        self.stack = frames;
    }

    /// Cached stack, innermost first.
    #[must_use]
    pub fn stack(&self) -> &[CachedFrame] {
        &self.stack
    }

    /// Replaces the cached variables.
    ///
    /// Names keep the position of their first occurrence; a repeated name
    /// overwrites the earlier value.
    pub fn replace_variables<I>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut snapshot: Vec<(String, Value)> = Vec::new();
        for (name, value) in variables {
            match snapshot.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => snapshot.push((name, value)),
            }
        }
        self.variables = snapshot;
    }

    /// Cached variables in display order.
    #[must_use]
    pub fn variables(&self) -> &[(String, Value)] {
        &self.variables
    }

    /// Starts a new run of `program`: the location resets to its first line.
    pub fn begin_program(&mut self, program: &str) {
        program.clone_into(&mut self.current_file);
        self.current_line = 1;
    }

    /// Updates the stop location. Absent values, and line 0, keep the
    /// previous ones.
    pub fn set_location(&mut self, file: Option<String>, line: Option<u32>) {
        if let Some(path) = file.filter(|path| !path.is_empty()) {
            self.current_file = path;
        }
        if let Some(number) = line.filter(|number| *number > 0) {
            self.current_line = number;
        }
    }

    /// File of the last stop.
    #[must_use]
    pub fn current_file(&self) -> &str {
        &self.current_file
    }

    /// Line of the last stop.
    #[must_use]
    pub const fn current_line(&self) -> u32 {
        self.current_line
    }

    /// Sets the exception break mode.
    pub const fn set_exception_mode(&mut self, mode: ExceptionBreakMode) {
        self.exception_mode = mode;
    }

    /// Current exception break mode.
    #[must_use]
    pub const fn exception_mode(&self) -> ExceptionBreakMode {
        self.exception_mode
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Moves the lifecycle forward to `next`.
    ///
    /// Returns `false`, leaving the state unchanged, if `next` is not later
    /// than the current state.
    pub fn advance_lifecycle(&mut self, next: Lifecycle) -> bool {
        if next > self.lifecycle {
            self.lifecycle = next;
            true
        } else {
            false
        }
    }

    /// Records the message of the latest exception stop, or clears it.
    pub fn record_exception(&mut self, message: Option<String>) {
        self.last_exception = message;
    }

    /// Message of the latest exception stop.
    #[must_use]
    pub fn last_exception(&self) -> Option<&str> {
        self.last_exception.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;

    #[fixture]
    fn store() -> SessionStore {
        SessionStore::new()
    }

    fn lines(lines: &[u32]) -> Vec<BreakpointRequest> {
        lines
            .iter()
            .map(|line| BreakpointRequest {
                line: *line,
                condition: None,
            })
            .collect()
    }

    #[rstest]
    fn replacing_breakpoints_returns_the_old_list_and_fresh_ids(mut store: SessionStore) {
        let first = store.replace_breakpoints("a.scm", lines(&[3, 5]));
        assert!(first.removed.is_empty());
        let first_ids: Vec<_> = first.installed.iter().map(|b| b.id).collect();
        assert_eq!(first_ids, vec![1, 2]);

        let second = store.replace_breakpoints("a.scm", lines(&[8]));
        assert_eq!(second.removed, first.installed);
        assert_eq!(second.installed.first().map(|b| b.id), Some(3));
        assert_eq!(store.breakpoints_for("a.scm"), second.installed.as_slice());
    }

    #[rstest]
    fn ids_are_unique_across_files(mut store: SessionStore) {
        store.replace_breakpoints("a.scm", lines(&[1]));
        let other = store.replace_breakpoints("b.scm", lines(&[1]));
        assert_eq!(other.installed.first().map(|b| b.id), Some(2));
        assert_eq!(store.breakpoints_for("a.scm").len(), 1);
    }

    #[rstest]
    fn clearing_a_file_forgets_it(mut store: SessionStore) {
        store.replace_breakpoints("a.scm", lines(&[1, 2]));
        let cleared = store.replace_breakpoints("a.scm", Vec::new());
        assert_eq!(cleared.removed.len(), 2);
        assert!(store.breakpoints_for("a.scm").is_empty());
    }

    #[rstest]
    fn blank_conditions_are_dropped(mut store: SessionStore) {
        let result = store.replace_breakpoints(
            "a.scm",
            vec![
                BreakpointRequest {
                    line: 1,
                    condition: Some(String::from("  ")),
                },
                BreakpointRequest {
                    line: 2,
                    condition: Some(String::from("(= n 0)")),
                },
            ],
        );
        let conditions: Vec<_> = result
            .installed
            .iter()
            .map(|b| b.condition.as_deref())
            .collect();
        assert_eq!(conditions, vec![None, Some("(= n 0)")]);
    }

    #[rstest]
    fn location_keeps_prior_values_for_absent_fields(mut store: SessionStore) {
        store.begin_program("/w/main.scm");
        assert_eq!((store.current_file(), store.current_line()), ("/w/main.scm", 1));

        store.set_location(None, Some(9));
        assert_eq!((store.current_file(), store.current_line()), ("/w/main.scm", 9));

        store.set_location(Some(String::from("/w/lib.scm")), Some(0));
        assert_eq!((store.current_file(), store.current_line()), ("/w/lib.scm", 9));
    }

    #[rstest]
    fn lifecycle_only_moves_forward(mut store: SessionStore) {
        assert!(store.advance_lifecycle(Lifecycle::Launched));
        assert!(!store.advance_lifecycle(Lifecycle::Initialized));
        assert!(!store.advance_lifecycle(Lifecycle::Launched));
        assert!(store.advance_lifecycle(Lifecycle::Terminated));
        assert_eq!(store.lifecycle(), Lifecycle::Terminated);
    }

    #[rstest]
    fn repeated_variable_names_update_in_place(mut store: SessionStore) {
        store.replace_variables(vec![
            (String::from("x"), json!(1)),
            (String::from("y"), json!("two")),
            (String::from("x"), json!(3)),
        ]);
        assert_eq!(
            store.variables(),
            [
                (String::from("x"), json!(3)),
                (String::from("y"), json!("two")),
            ]
        );
    }

    #[rstest]
    fn watches_are_registered_once(mut store: SessionStore) {
        let first = store.add_watch("(length xs)");
        let again = store.add_watch("(length xs)");
        assert_eq!(first, again);
        assert_eq!(store.watches().len(), 1);

        store.replace_watches(vec![Watch {
            id: 10,
            expression: String::from("n"),
            value: Some(String::from("4")),
        }]);
        assert_eq!(store.add_watch("m"), 11);
        store.clear_watches();
        assert!(store.watches().is_empty());
    }

    #[rstest]
    #[case(ExceptionBreakMode::Never, "never")]
    #[case(ExceptionBreakMode::Always, "always")]
    #[case(ExceptionBreakMode::Uncaught, "unhandled")]
    fn break_modes_use_client_names(#[case] mode: ExceptionBreakMode, #[case] name: &str) {
        assert_eq!(mode.break_mode(), name);
    }
}
