//! Maps backend events onto session state and client events.
//!
//! Translation is a plain function of the store and one event. It never
//! touches the backend or the client stream, which keeps the mapping
//! deterministic and directly testable.

use tracing::debug;

use crate::backend::{BackendEvent, StopPayload};
use crate::events::{FrontEndEvent, StopReason};
use crate::state::{CachedFrame, Lifecycle, SessionStore, Watch};

const TRANSLATE_TARGET: &str = "scheme_dap::translate";

/// Category used when neither the backend nor the line says otherwise.
pub const DEFAULT_OUTPUT_CATEGORY: &str = "stdout";

/// Applies `event` to `store` and returns the client events it produces.
pub fn translate(store: &mut SessionStore, event: BackendEvent) -> Vec<FrontEndEvent> {
    match event {
        BackendEvent::Paused(stop) => stopped(
            store,
            StopPayload {
                message: None,
                ..stop
            },
            None,
        ),
        BackendEvent::Stopped(stop) => stopped(store, stop, None),
        BackendEvent::Breakpoint(stop) => stopped(store, stop, Some(StopReason::Breakpoint)),
        BackendEvent::Terminated => {
            store.advance_lifecycle(Lifecycle::Terminated);
            vec![FrontEndEvent::Terminated]
        }
        BackendEvent::Output(output) => vec![FrontEndEvent::output(
            output
                .category
                .unwrap_or_else(|| DEFAULT_OUTPUT_CATEGORY.to_owned()),
            output.text.unwrap_or_default(),
        )],
        BackendEvent::Stack(stack) => {
            let frames = stack
                .frames
                .unwrap_or_default()
                .into_iter()
                .map(|entry| CachedFrame {
                    name: entry.name,
                    file: entry.file,
                    line: entry.line,
                })
                .collect();
            store.replace_stack(frames);
            Vec::new()
        }
        BackendEvent::Variables(snapshot) => {
            if let Some(variables) = snapshot.variables {
                store.replace_variables(
                    variables
                        .into_iter()
                        .map(|variable| (variable.name, variable.value)),
                );
            }
            Vec::new()
        }
        BackendEvent::Watch(snapshot) => {
            if let Some(watches) = snapshot.watches {
                store.replace_watches(
                    watches
                        .into_iter()
                        .map(|entry| Watch {
                            id: entry.id,
                            expression: entry.expression,
                            value: entry.value,
                        })
                        .collect(),
                );
            }
            Vec::new()
        }
        BackendEvent::Unrecognized => {
            debug!(target: TRANSLATE_TARGET, "ignoring unrecognised backend event");
            Vec::new()
        }
    }
}

/// Wraps a line that was not a protocol event as program output.
#[must_use]
pub fn translate_text(line: &str) -> FrontEndEvent {
    FrontEndEvent::output(DEFAULT_OUTPUT_CATEGORY, format!("{line}\n"))
}

fn stopped(
    store: &mut SessionStore,
    stop: StopPayload,
    forced: Option<StopReason>,
) -> Vec<FrontEndEvent> {
    store.set_location(stop.file, stop.line);
    let reason = forced.unwrap_or_else(|| StopReason::from_backend(stop.reason));
    let text = match reason {
        StopReason::Exception => stop.message,
        _ => None,
    };
    store.record_exception(text.clone());
    vec![FrontEndEvent::Stopped { reason, text }]
}
