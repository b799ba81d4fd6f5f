//! `continue`, `next`, `stepIn` and `stepOut`.

use super::{Context, HandlerResult, Reply};
use crate::backend::BackendCommand;
use crate::dap::types::ContinueBody;

pub(crate) fn resume(ctx: &mut Context<'_>) -> HandlerResult {
    ctx.backend.send(&BackendCommand::Continue);
    Reply::with_body(&ContinueBody {
        all_threads_continued: true,
    })
}

pub(crate) fn next(ctx: &mut Context<'_>) -> Reply {
    step_with(ctx, &BackendCommand::Next)
}

pub(crate) fn step_in(ctx: &mut Context<'_>) -> Reply {
    step_with(ctx, &BackendCommand::Step)
}

pub(crate) fn step_out(ctx: &mut Context<'_>) -> Reply {
    step_with(ctx, &BackendCommand::Finish)
}

fn step_with(ctx: &mut Context<'_>, command: &BackendCommand) -> Reply {
    ctx.backend.send(command);
    Reply::empty()
}
