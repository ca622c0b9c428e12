//! Incremental line splitting that never loses bytes.

use std::io::{Read, Result};

/// Longest segment the scanner buffers before yielding it unterminated.
///
/// Protects against unbounded buffering when the input contains no line
/// break for a long while; the oversized segment is handed out as-is and
/// scanning continues with the following bytes.
const MAX_SEGMENT: usize = 64 * 1024;

const CHUNK: usize = 4096;

/// Splits a byte stream into segments, one per call.
///
/// Unlike a plain line iterator this keeps the trailing `\n` or `\r\n` on
/// every segment, so the concatenation of all segments reproduces the input
/// byte for byte. Trailing bytes at end of stream and segments longer than
/// [`MAX_SEGMENT`] come out unterminated.
pub(crate) struct LineScanner<R> {
    inner: R,
    buffer: Vec<u8>,
    eof: bool,
}

impl<R: Read> LineScanner<R> {
    pub(crate) fn new(inner: R) -> LineScanner<R> {
        LineScanner {
            inner,
            buffer: Vec::new(),
            eof: false,
        }
    }

    /// Returns the next segment, or `None` at end of stream.
    pub(crate) fn next_segment(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let segment = self.buffer.drain(..=pos).collect();
                return Ok(Some(segment));
            }
            if self.buffer.len() >= MAX_SEGMENT || (self.eof && !self.buffer.is_empty()) {
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }
            if self.eof {
                return Ok(None);
            }

            let mut chunk = [0u8; CHUNK];
            let count = self.inner.read(&mut chunk)?;
            if count == 0 {
                self.eof = true;
            } else {
                self.buffer.extend_from_slice(&chunk[..count]);
            }
        }
    }
}
