//! One handler per client request.
//!
//! Handlers read and update the [`SessionStore`], queue backend commands on
//! the [`BackendChannel`] and produce a [`Reply`]. None of them waits for the
//! backend: answers that depend on backend data come from the last cached
//! snapshot.

pub(crate) mod breakpoints;
pub(crate) mod execution;
pub(crate) mod inspection;
pub(crate) mod lifecycle;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{EnumString, IntoStaticStr};

use crate::errors::RequestError;
use crate::events::FrontEndEvent;
use crate::process::BackendChannel;
use crate::state::SessionStore;

pub(crate) const HANDLER_TARGET: &str = "scheme_dap::handlers";

/// Requests the adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum Command {
    Initialize,
    Launch,
    SetBreakpoints,
    SetExceptionBreakpoints,
    Threads,
    StackTrace,
    Scopes,
    Variables,
    Evaluate,
    Continue,
    Next,
    StepIn,
    StepOut,
    Disconnect,
    ConfigurationDone,
    ExceptionInfo,
}

/// State a handler may touch.
pub(crate) struct Context<'a> {
    pub(crate) store: &'a mut SessionStore,
    pub(crate) backend: &'a mut BackendChannel,
}

/// Successful handler outcome: a response body plus events to send after it.
#[derive(Debug, Default)]
pub(crate) struct Reply {
    pub(crate) body: Option<Value>,
    pub(crate) events: Vec<FrontEndEvent>,
}

impl Reply {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_body<T: Serialize>(body: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(body).map_err(|error| RequestError::Encode {
            message: error.to_string(),
        })?;
        Ok(Self {
            body: Some(value),
            events: Vec::new(),
        })
    }

    pub(crate) fn with_events(mut self, events: Vec<FrontEndEvent>) -> Self {
        self.events = events;
        self
    }
}

pub(crate) type HandlerResult = Result<Reply, RequestError>;

/// Decodes request arguments; absent arguments decode to the default.
pub(crate) fn decode_arguments<T>(command: &str, arguments: &Value) -> Result<T, RequestError>
where
    T: DeserializeOwned + Default,
{
    if arguments.is_null() {
        return Ok(T::default());
    }
    T::deserialize(arguments).map_err(|error| RequestError::InvalidArguments {
        command: command.to_owned(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::dap::types::EvaluateArguments;

    #[rstest]
    #[case("setExceptionBreakpoints", Command::SetExceptionBreakpoints)]
    #[case("stepIn", Command::StepIn)]
    #[case("configurationDone", Command::ConfigurationDone)]
    #[case("exceptionInfo", Command::ExceptionInfo)]
    fn request_names_parse(#[case] name: &str, #[case] expected: Command) {
        assert_eq!(Command::from_str(name).ok(), Some(expected));
        let round: &'static str = expected.into();
        assert_eq!(round, name);
    }

    #[rstest]
    fn unknown_request_names_are_rejected() {
        assert!(Command::from_str("restartFrame").is_err());
    }

    #[rstest]
    fn null_arguments_decode_to_defaults() {
        let args: EvaluateArguments =
            decode_arguments("evaluate", &Value::Null).expect("defaults");
        assert_eq!(args, EvaluateArguments::default());
    }

    #[rstest]
    fn mistyped_arguments_name_the_request() {
        let error = decode_arguments::<EvaluateArguments>("evaluate", &json!({"expression": 3}))
            .expect_err("expression must be a string");
        assert!(matches!(
            error,
            RequestError::InvalidArguments { ref command, .. } if command == "evaluate"
        ));
    }
}
