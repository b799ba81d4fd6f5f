//! `setBreakpoints` and `setExceptionBreakpoints`.

use tracing::debug;

use super::{Context, HANDLER_TARGET, HandlerResult, Reply};
use crate::backend::{BackendCommand, CatchMode};
use crate::dap::types::{
    BreakpointBody, SetBreakpointsArguments, SetBreakpointsBody, SetExceptionBreakpointsArguments,
    Source,
};
use crate::state::{BreakpointRequest, ExceptionBreakMode};

/// Replaces every breakpoint of one file.
///
/// Old ids are deleted on the backend before the new breakpoints are
/// installed. Verification is optimistic: the backend never confirms.
pub(crate) fn set_breakpoints(
    ctx: &mut Context<'_>,
    args: SetBreakpointsArguments,
) -> HandlerResult {
    let file = args.source.path.unwrap_or_default();
    let requested = args.breakpoints.into_iter().map(|breakpoint| BreakpointRequest {
        line: breakpoint.line,
        condition: breakpoint.condition,
    });
    let replacement = ctx.store.replace_breakpoints(&file, requested);
    debug!(
        target: HANDLER_TARGET,
        file = %file,
        removed = replacement.removed.len(),
        installed = replacement.installed.len(),
        "replacing breakpoints"
    );

    for old in &replacement.removed {
        ctx.backend
            .send(&BackendCommand::Delete { breakpoint: old.id });
    }
    for breakpoint in &replacement.installed {
        ctx.backend.send(&BackendCommand::Break {
            file: breakpoint.file.clone(),
            line: breakpoint.line,
            condition: breakpoint.condition.clone(),
        });
    }

    let source = Source::from_path(&file);
    Reply::with_body(&SetBreakpointsBody {
        breakpoints: replacement
            .installed
            .iter()
            .map(|breakpoint| BreakpointBody {
                id: breakpoint.id,
                verified: breakpoint.verified,
                line: breakpoint.line,
                source: source.clone(),
            })
            .collect(),
    })
}

/// Selects the exception break mode; `all` wins over `uncaught`.
pub(crate) fn set_exception_breakpoints(
    ctx: &mut Context<'_>,
    args: &SetExceptionBreakpointsArguments,
) -> Reply {
    let selected = |filter: &str| args.filters.iter().any(|name| name == filter);
    let (mode, catch) = if selected("all") {
        (ExceptionBreakMode::Always, CatchMode::All)
    } else if selected("uncaught") {
        (ExceptionBreakMode::Uncaught, CatchMode::Uncaught)
    } else {
        (ExceptionBreakMode::Never, CatchMode::Disabled)
    };
    ctx.store.set_exception_mode(mode);
    ctx.backend.send(&BackendCommand::Catch { mode: catch });
    Reply::empty()
}
