//! Requests answered from cached snapshots: threads, stack, scopes,
//! variables, evaluation and exception details.
//!
//! Each request that depends on backend data also asks the backend for a
//! fresh snapshot, which arrives later as an event and serves the next
//! request.

use serde_json::Value;

use super::{Context, HandlerResult, Reply};
use crate::backend::BackendCommand;
use crate::dap::THREAD_ID;
use crate::dap::types::{
    EvaluateArguments, EvaluateBody, ExceptionInfoBody, Scope, ScopesBody, Source, StackFrame,
    StackTraceArguments, StackTraceBody, Thread, ThreadsBody, Variable, VariablesBody,
};
use crate::errors::RequestError;

const TOP_FRAME_NAME: &str = "<top>";
const WATCH_CONTEXT: &str = "watch";

pub(crate) fn threads() -> HandlerResult {
    Reply::with_body(&ThreadsBody {
        threads: vec![Thread {
            id: THREAD_ID,
            name: "Main Thread",
        }],
    })
}

/// Frame 0 is the current stop location; the cached frames follow it.
pub(crate) fn stack_trace(ctx: &mut Context<'_>, args: &StackTraceArguments) -> HandlerResult {
    ctx.backend.send(&BackendCommand::Backtrace);

    let cached = ctx.store.stack();
    let top_name = cached
        .first()
        .map_or(TOP_FRAME_NAME, |frame| frame.name.as_str());
    let top = StackFrame {
        id: 0,
        name: top_name.to_owned(),
        source: Source::from_path(ctx.store.current_file()),
        line: ctx.store.current_line(),
        column: 1,
    };
    let frames: Vec<StackFrame> = std::iter::once(top)
        .chain(cached.iter().enumerate().map(|(index, frame)| StackFrame {
            id: index + 1,
            name: frame.name.clone(),
            source: Source::from_path(&frame.file),
            line: frame.line,
            column: 1,
        }))
        .collect();

    let total_frames = frames.len();
    let levels = args.levels.filter(|levels| *levels > 0).unwrap_or(usize::MAX);
    Reply::with_body(&StackTraceBody {
        stack_frames: frames
            .into_iter()
            .skip(args.start_frame.unwrap_or(0))
            .take(levels)
            .collect(),
        total_frames,
    })
}

pub(crate) fn scopes() -> HandlerResult {
    Reply::with_body(&ScopesBody {
        scopes: vec![
            Scope {
                name: "Local",
                variables_reference: 1,
                expensive: false,
            },
            Scope {
                name: "Global",
                variables_reference: 2,
                expensive: true,
            },
        ],
    })
}

pub(crate) fn variables(ctx: &mut Context<'_>) -> HandlerResult {
    ctx.backend.send(&BackendCommand::Locals);
    Reply::with_body(&VariablesBody {
        variables: ctx
            .store
            .variables()
            .iter()
            .map(|(name, value)| Variable {
                name: name.clone(),
                value: render_value(value),
                variables_reference: 0,
            })
            .collect(),
    })
}

/// Strings are shown raw; any other value as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// The backend prints the result asynchronously and has no way to
/// correlate it with this request, so the response is a placeholder.
pub(crate) fn evaluate(ctx: &mut Context<'_>, args: &EvaluateArguments) -> HandlerResult {
    ctx.backend.send(&BackendCommand::Print {
        expression: args.expression.clone(),
    });
    if args.context.as_deref() == Some(WATCH_CONTEXT) {
        ctx.store.add_watch(&args.expression);
    }
    Reply::with_body(&EvaluateBody {
        result: format!("<evaluating {}>", args.expression),
        variables_reference: 0,
    })
}

pub(crate) fn exception_info(ctx: &Context<'_>) -> HandlerResult {
    let description = ctx
        .store
        .last_exception()
        .ok_or(RequestError::NoException)?;
    Reply::with_body(&ExceptionInfoBody {
        exception_id: "exception",
        description: description.to_owned(),
        break_mode: ctx.store.exception_mode().break_mode(),
    })
}
