//! Events the bridge sends to the debugging client.

/// Why execution stopped, in client vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A step finished.
    Step,
    /// A breakpoint was hit.
    Breakpoint,
    /// An exception was raised.
    Exception,
    /// A watched value changed.
    DataBreakpoint,
    /// Any other backend reason, passed through unchanged.
    Other(String),
}

impl StopReason {
    /// Maps a backend reason; an absent reason means a step.
    #[must_use]
    pub fn from_backend(reason: Option<String>) -> Self {
        match reason.as_deref() {
            None | Some("step") => Self::Step,
            Some("breakpoint") => Self::Breakpoint,
            Some("exception") => Self::Exception,
            Some("data breakpoint") => Self::DataBreakpoint,
            Some(_) => Self::Other(reason.unwrap_or_default()),
        }
    }

    /// Reason string sent to the client.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Step => "step",
            Self::Breakpoint => "breakpoint",
            Self::Exception => "exception",
            Self::DataBreakpoint => "data breakpoint",
            Self::Other(reason) => reason,
        }
    }
}

/// An event for the debugging client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontEndEvent {
    /// The adapter is ready to accept configuration requests.
    Initialized,
    /// The single thread stopped.
    Stopped {
        /// Why it stopped.
        reason: StopReason,
        /// Exception message, shown by the client next to the stop.
        text: Option<String>,
    },
    /// The debug session ended.
    Terminated,
    /// Text for the client's debug console.
    Output {
        /// Output category such as `stdout` or `stderr`.
        category: String,
        /// Text, including any line terminators.
        output: String,
    },
}

impl FrontEndEvent {
    /// Builds an output event.
    pub fn output(category: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Output {
            category: category.into(),
            output: output.into(),
        }
    }

    /// Client event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Stopped { .. } => "stopped",
            Self::Terminated => "terminated",
            Self::Output { .. } => "output",
        }
    }
}
