//! `initialize`, `launch` and `disconnect`.

use std::sync::Arc;

use tracing::{info, warn};

use super::{Context, HANDLER_TARGET, HandlerResult, Reply};
use crate::backend::{BackendCommand, CatchMode};
use crate::dap::types::{Capabilities, LaunchArguments};
use crate::errors::RequestError;
use crate::events::FrontEndEvent;
use crate::process::{BackendLauncher, LaunchSpec, SignalSink};
use crate::state::{ExceptionBreakMode, Lifecycle};

/// What `launch` needs beyond the session state.
pub(crate) struct LaunchEnvironment<'a> {
    pub(crate) launcher: &'a dyn BackendLauncher,
    pub(crate) sink: &'a Arc<dyn SignalSink>,
    pub(crate) fallback_backend: Option<&'a str>,
}

pub(crate) fn initialize(ctx: &mut Context<'_>) -> HandlerResult {
    let state = ctx.store.lifecycle();
    if state != Lifecycle::Uninitialized {
        return Err(RequestError::Lifecycle {
            command: String::from("initialize"),
            state,
        });
    }
    ctx.store.advance_lifecycle(Lifecycle::Initialized);
    Ok(Reply::with_body(&Capabilities::scheme())?.with_events(vec![FrontEndEvent::Initialized]))
}

pub(crate) fn launch(
    ctx: &mut Context<'_>,
    env: &LaunchEnvironment<'_>,
    args: &LaunchArguments,
) -> HandlerResult {
    let state = ctx.store.lifecycle();
    if state != Lifecycle::Initialized {
        return Err(RequestError::Lifecycle {
            command: String::from("launch"),
            state,
        });
    }

    let backend = non_blank(args.compiler_path.as_deref())
        .or_else(|| non_blank(env.fallback_backend))
        .ok_or_else(|| RequestError::configuration("compiler/backend path not specified"))?;
    let program = non_blank(args.program.as_deref())
        .ok_or_else(|| RequestError::configuration("program not specified"))?;

    let spec = LaunchSpec::debug_session(backend, program);
    ctx.store.begin_program(program);

    match env.launcher.launch(&spec, Arc::clone(env.sink)) {
        Ok(handle) => {
            info!(
                target: HANDLER_TARGET,
                backend,
                program,
                stop_on_entry = args.stop_on_entry,
                "backend launched"
            );
            ctx.backend.attach(handle);
            ctx.store.advance_lifecycle(Lifecycle::Launched);
            replay_configuration(ctx);
            let start = if args.stop_on_entry {
                BackendCommand::Step
            } else {
                BackendCommand::Continue
            };
            ctx.backend.send(&start);
            Ok(Reply::empty())
        }
        Err(error) => {
            warn!(target: HANDLER_TARGET, backend, program, %error, "backend launch failed");
            ctx.store.advance_lifecycle(Lifecycle::Terminated);
            Ok(Reply::empty().with_events(vec![
                FrontEndEvent::output("stderr", format!("Error: {error}\n")),
                FrontEndEvent::Terminated,
            ]))
        }
    }
}

/// Installs breakpoints and the exception mode configured before launch.
fn replay_configuration(ctx: &mut Context<'_>) {
    for breakpoint in ctx.store.all_breakpoints() {
        ctx.backend.send(&BackendCommand::Break {
            file: breakpoint.file.clone(),
            line: breakpoint.line,
            condition: breakpoint.condition.clone(),
        });
    }
    let mode = match ctx.store.exception_mode() {
        ExceptionBreakMode::Never => return,
        ExceptionBreakMode::Always => CatchMode::All,
        ExceptionBreakMode::Uncaught => CatchMode::Uncaught,
    };
    ctx.backend.send(&BackendCommand::Catch { mode });
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

pub(crate) fn disconnect(ctx: &mut Context<'_>) -> Reply {
    if ctx.backend.shutdown() {
        info!(target: HANDLER_TARGET, "backend terminated on disconnect");
    }
    ctx.store.advance_lifecycle(Lifecycle::Terminated);
    Reply::empty()
}
