//! `Content-Length` framing over the adapter's stdin and stdout.
//!
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <payload>
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::protocol::DapRequest;

const CONTENT_LENGTH: &str = "content-length";

/// Errors raised while reading or writing framed messages.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// A header block ended without a `Content-Length` header.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// A header line could not be parsed.
    #[error("invalid header line: {line}")]
    InvalidHeader {
        /// The offending line, trimmed.
        line: String,
    },

    /// The payload was not the expected JSON.
    #[error("JSON codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}

impl TransportError {
    /// Reports whether the stream is still in sync after this error.
    ///
    /// A payload that fails to decode has still been consumed in full, so
    /// the next message can be read normally.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Codec(_))
    }
}

/// Reads framed messages.
#[derive(Debug)]
pub struct MessageReader<R> {
    reader: R,
}

impl<R: BufRead> MessageReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads one payload. Returns `Ok(None)` on a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for malformed headers, a missing length
    /// or an I/O failure, including a stream that ends mid-message.
    pub fn read_message(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(length) = self.read_headers()? else {
            return Ok(None);
        };
        let mut payload = vec![0_u8; length];
        self.reader.read_exact(&mut payload)?;
        Ok(Some(payload))
    }

    /// Reads and decodes one request.
    ///
    /// # Errors
    ///
    /// As [`MessageReader::read_message`], plus [`TransportError::Codec`] when
    /// the payload is not a request.
    pub fn read_request(&mut self) -> Result<Option<DapRequest>, TransportError> {
        match self.read_message()? {
            Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
            None => Ok(None),
        }
    }

    fn read_headers(&mut self) -> Result<Option<usize>, TransportError> {
        let mut content_length = None;
        let mut seen_any = false;
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                if seen_any {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "stream closed while reading headers",
                    )
                    .into());
                }
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if seen_any {
                    break;
                }
                continue;
            }
            seen_any = true;
            if let Some(length) = parse_content_length(trimmed)? {
                content_length = Some(length);
            }
        }
        content_length
            .map(Some)
            .ok_or(TransportError::MissingContentLength)
    }
}

fn parse_content_length(header: &str) -> Result<Option<usize>, TransportError> {
    let invalid = || TransportError::InvalidHeader {
        line: header.to_owned(),
    };
    let (name, value) = header.split_once(':').ok_or_else(invalid)?;
    if !name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
        return Ok(None);
    }
    value.trim().parse().map(Some).map_err(|_| invalid())
}

/// Writes framed messages.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: Write> MessageWriter<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Serialises `message` and writes it with its header, then flushes.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if encoding or writing fails.
    pub fn write_message<T: Serialize>(&mut self, message: &T) -> Result<(), TransportError> {
        let payload = serde_json::to_vec(message)?;
        write!(self.writer, "Content-Length: {}\r\n\r\n", payload.len())?;
        self.writer.write_all(&payload)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn framed(payload: &str) -> String {
        format!("Content-Length: {}\r\n\r\n{payload}", payload.len())
    }

    #[rstest]
    fn reads_consecutive_messages_then_clean_eof() {
        let input = format!("{}{}", framed("{\"a\":1}"), framed("[]"));
        let mut reader = MessageReader::new(Cursor::new(input.into_bytes()));
        assert_eq!(
            reader.read_message().expect("first"),
            Some(b"{\"a\":1}".to_vec())
        );
        assert_eq!(reader.read_message().expect("second"), Some(b"[]".to_vec()));
        assert_eq!(reader.read_message().expect("eof"), None);
    }

    #[rstest]
    fn ignores_other_headers_and_header_case() {
        let input = "content-length: 2\r\nContent-Type: application/json\r\n\r\n{}";
        let mut reader = MessageReader::new(Cursor::new(input.as_bytes().to_vec()));
        assert_eq!(reader.read_message().expect("message"), Some(b"{}".to_vec()));
    }

    #[rstest]
    fn rejects_missing_length() {
        let input = "Content-Type: application/json\r\n\r\n{}";
        let mut reader = MessageReader::new(Cursor::new(input.as_bytes().to_vec()));
        assert!(matches!(
            reader.read_message(),
            Err(TransportError::MissingContentLength)
        ));
    }

    #[rstest]
    #[case("Content-Length: lots\r\n\r\n")]
    #[case("garbage\r\n\r\n")]
    fn rejects_malformed_headers(#[case] input: &str) {
        let mut reader = MessageReader::new(Cursor::new(input.as_bytes().to_vec()));
        assert!(matches!(
            reader.read_message(),
            Err(TransportError::InvalidHeader { .. })
        ));
    }

    #[rstest]
    fn truncated_payload_is_an_io_error() {
        let input = "Content-Length: 10\r\n\r\n{}";
        let mut reader = MessageReader::new(Cursor::new(input.as_bytes().to_vec()));
        let error = reader.read_message().expect_err("payload is short");
        assert!(matches!(error, TransportError::Io(_)));
        assert!(!error.is_recoverable());
    }

    #[rstest]
    fn undecodable_requests_leave_the_stream_in_sync() {
        let input = format!(
            "{}{}",
            framed("{\"seq\":1}"),
            framed(r#"{"seq":2,"type":"request","command":"threads"}"#)
        );
        let mut reader = MessageReader::new(Cursor::new(input.into_bytes()));
        let error = reader.read_request().expect_err("first lacks a command");
        assert!(error.is_recoverable());
        let request = reader.read_request().expect("second").expect("present");
        assert_eq!(request.command, "threads");
    }

    #[rstest]
    fn writes_framed_json() {
        let mut writer = MessageWriter::new(Vec::new());
        writer
            .write_message(&json!({"seq": 1}))
            .expect("write should succeed");
        let written = String::from_utf8(writer.into_inner()).expect("utf8");
        assert_eq!(written, "Content-Length: 9\r\n\r\n{\"seq\":1}");
    }
}
