// SPDX-License-Identifier: GPL-3.0-only

//! Newline-delimited JSON response streaming
//!
//! Body chunks arrive at arbitrary boundaries; [`LineBuffer`] reassembles
//! them into complete lines and [`ndjson_lines`] exposes a response body as a
//! stream of lines. Parsing each line is left to the caller so one bad line
//! does not end the stream.

use crate::errors::RemoteError;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

/// Accumulates bytes and yields complete, non-blank lines
///
/// A line that is not valid UTF-8 comes out as [`RemoteError::MalformedLine`]
/// so the caller can report it and keep reading.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Bytes of `pending` already searched for a newline
    scanned: usize,
}

impl LineBuffer {
    /// Append a chunk and return every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<String, RemoteError>> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut line_start = 0;
        for pos in self.scanned..self.pending.len() {
            if self.pending[pos] == b'\n' {
                if let Some(line) = decode_line(&self.pending[line_start..pos]) {
                    lines.push(line);
                }
                line_start = pos + 1;
            }
        }
        self.pending.drain(..line_start);
        self.scanned = self.pending.len();
        lines
    }

    /// Remaining text after the body ended without a final newline
    pub fn finish(self) -> Option<Result<String, RemoteError>> {
        decode_line(&self.pending)
    }
}

fn decode_line(bytes: &[u8]) -> Option<Result<String, RemoteError>> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(
        String::from_utf8(bytes.to_vec()).map_err(|e| RemoteError::MalformedLine {
            line: String::from_utf8_lossy(bytes).into_owned(),
            reason: e.to_string(),
        }),
    )
}

/// Stream the lines of a response body
///
/// A transport failure is yielded once and ends the stream. Undecodable
/// lines are yielded as [`RemoteError::MalformedLine`] and the stream goes on.
pub fn ndjson_lines(response: reqwest::Response) -> impl Stream<Item = Result<String, RemoteError>> {
    async_stream::stream! {
        let mut body = response.bytes_stream();
        let mut buffer = LineBuffer::default();
        let mut failed = false;
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    for line in buffer.push(&chunk) {
                        yield line;
                    }
                }
                Err(e) => {
                    failed = true;
                    yield Err(RemoteError::from(e));
                    break;
                }
            }
        }
        if !failed {
            if let Some(line) = buffer.finish() {
                yield line;
            }
        }
    }
}

/// Parse one line as JSON
pub fn parse_line<T: DeserializeOwned>(line: &str) -> Result<T, RemoteError> {
    serde_json::from_str(line).map_err(|e| RemoteError::MalformedLine {
        line: line.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StatusLine;

    fn ok_lines(lines: Vec<Result<String, RemoteError>>) -> Vec<String> {
        lines.into_iter().map(Result::unwrap).collect()
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut buffer = LineBuffer::default();
        assert!(buffer.push(b"{\"a\":").is_empty());
        assert_eq!(ok_lines(buffer.push(b"1}\n{\"b\"")), vec!["{\"a\":1}"]);
        assert_eq!(ok_lines(buffer.push(b":2}\r\n\n")), vec!["{\"b\":2}"]);
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_several_lines_in_one_chunk() {
        let mut buffer = LineBuffer::default();
        assert_eq!(
            ok_lines(buffer.push(b"one\ntwo\nthree\nfo")),
            vec!["one", "two", "three"]
        );
        assert_eq!(buffer.finish().unwrap().unwrap(), "fo");
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let mut buffer = LineBuffer::default();
        assert_eq!(ok_lines(buffer.push(b"one\ntwo")), vec!["one"]);
        assert_eq!(buffer.finish().unwrap().unwrap(), "two");
    }

    #[test]
    fn test_multibyte_split() {
        let text = "{\"status_message\":\"Überprüfung\"}\n".as_bytes();
        let mut buffer = LineBuffer::default();
        let mut lines = buffer.push(&text[..20]);
        lines.extend(buffer.push(&text[20..]));
        let lines = ok_lines(lines);
        let line: StatusLine = parse_line(&lines[0]).unwrap();
        assert_eq!(line.status_message, "Überprüfung");
    }

    #[test]
    fn test_invalid_utf8_line_reported_and_reading_continues() {
        let mut buffer = LineBuffer::default();
        let lines = buffer.push(b"{\"status_message\":\"a\xff\"}\n{\"status_message\":\"b\"}\n");

        assert_eq!(lines.len(), 2);
        assert!(matches!(lines[0], Err(RemoteError::MalformedLine { .. })));
        assert_eq!(lines[1].as_deref().unwrap(), "{\"status_message\":\"b\"}");
    }

    #[test]
    fn test_long_line_scanned_once() {
        let chunk = vec![b'A'; 16 * 1024];
        let chunks = 8 * 64; // 8 MiB
        let mut buffer = LineBuffer::default();

        let started = std::time::Instant::now();
        for _ in 0..chunks {
            assert!(buffer.push(&chunk).is_empty());
            assert_eq!(buffer.scanned, buffer.pending.len());
        }
        let lines = ok_lines(buffer.push(b"\n"));
        let elapsed = started.elapsed();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), chunk.len() * chunks);
        assert!(buffer.pending.is_empty());
        assert!(
            elapsed < std::time::Duration::from_secs(5),
            "reassembly took {:?}",
            elapsed
        );
    }

    #[test]
    fn test_parse_line_error_keeps_text() {
        let err = parse_line::<StatusLine>("not json").unwrap_err();
        assert!(matches!(err, RemoteError::MalformedLine { ref line, .. } if line == "not json"));
    }
}
