//! Line framing for the backend's stdout stream.
//!
//! Reads arrive in arbitrary chunks. The framer keeps the unterminated tail
//! between reads and classifies every complete line as either a decoded
//! [`BackendEvent`] or passthrough text, so the result does not depend on
//! where the chunk boundaries fell.

use tracing::trace;

use crate::backend::BackendEvent;

const FRAMER_TARGET: &str = "scheme_dap::framer";

/// A complete line read from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum FramedLine {
    /// A protocol event.
    Event(BackendEvent),
    /// Anything else, without its line terminator.
    Text(String),
}

/// Splits a byte stream into [`FramedLine`]s.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    /// Creates a framer with an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Appends `bytes` and yields every line they complete, in order.
    ///
    /// Lines not pulled from the returned iterator stay buffered and are
    /// yielded by the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> FramedLines<'_> {
        self.pending.extend_from_slice(bytes);
        FramedLines {
            framer: self,
            consumed: 0,
        }
    }

    /// Flushes the unterminated tail once the stream has closed.
    pub fn finish(&mut self) -> Option<FramedLine> {
        let tail = std::mem::take(&mut self.pending);
        classify(&tail)
    }

    /// Number of buffered bytes not yet part of a complete line.
    #[must_use]
    pub const fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Iterator over the lines completed by one [`LineFramer::feed`] call.
#[derive(Debug)]
pub struct FramedLines<'a> {
    framer: &'a mut LineFramer,
    consumed: usize,
}

impl Iterator for FramedLines<'_> {
    type Item = FramedLine;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.framer.pending.get(self.consumed..)?;
            let newline = rest.iter().position(|byte| *byte == b'\n')?;
            let line = rest.get(..newline).unwrap_or_default();
            let framed = classify(line);
            self.consumed += newline + 1;
            if framed.is_some() {
                return framed;
            }
        }
    }
}

impl Drop for FramedLines<'_> {
    fn drop(&mut self) {
        self.framer.pending.drain(..self.consumed);
    }
}

fn classify(raw: &[u8]) -> Option<FramedLine> {
    let line = raw.strip_suffix(b"\r").unwrap_or(raw);
    let text = String::from_utf8_lossy(line);
    if text.trim().is_empty() {
        return None;
    }
    match BackendEvent::decode(&text) {
        Ok(event) => Some(FramedLine::Event(event)),
        Err(error) => {
            trace!(target: FRAMER_TARGET, %error, "passing backend line through as text");
            Some(FramedLine::Text(text.into_owned()))
        }
    }
}
