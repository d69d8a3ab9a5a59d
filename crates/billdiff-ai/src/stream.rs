//! Incremental reader for the chunked analysis response.
//!
//! The analysis service replies with `data: <payload>` lines, but the
//! transport delivers bytes split at arbitrary boundaries: inside the
//! prefix, inside a payload, even inside a multi-byte character. The reader
//! carries the unterminated tail between chunks and yields each completed
//! payload exactly once, in send order.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::client::AnalyzeError;

const DATA_PREFIX: &[u8] = b"data: ";

/// Reassembles `data: ` lines from arbitrarily split byte chunks.
///
/// Works on bytes, not decoded text: splitting only at `\n` keeps a
/// multi-byte character that straddles chunks intact in the carried tail.
/// The buffer holds at most the bytes since the last newline.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one chunk and return the payloads of every line it completed.
    ///
    /// Lines without the `data: ` prefix and lines with an empty payload are
    /// skipped, matching the wire protocol's blank keep-alive lines.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let line = &self.buffer[start..start + pos];
            if let Some(payload) = data_payload(line) {
                payloads.push(payload);
            }
            start += pos + 1;
        }
        self.buffer.drain(..start);
        payloads
    }

    /// Bytes currently held back waiting for a newline.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    if payload.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(payload).into_owned())
}

/// A finite, non-restartable stream of analysis text fragments.
///
/// Yields each fragment exactly once in send order. After the transport
/// closes, any unterminated residue is discarded and the stream stays
/// exhausted; a transport error is yielded exactly once and also exhausts
/// it. Dropping the value drops the transport, which cancels the request.
pub struct AnalysisStream<S> {
    inner: S,
    assembler: LineAssembler,
    ready: VecDeque<String>,
    open: bool,
}

impl<S> AnalysisStream<S>
where
    S: Stream<Item = Result<Bytes, AnalyzeError>> + Unpin,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            assembler: LineAssembler::new(),
            ready: VecDeque::new(),
            open: true,
        }
    }

    /// Wait for the next fragment.
    ///
    /// `None` means the stream ended normally; `Some(Err(_))` is the single
    /// terminal failure, after which only `None` follows.
    pub async fn next_fragment(&mut self) -> Option<Result<String, AnalyzeError>> {
        loop {
            if let Some(fragment) = self.ready.pop_front() {
                return Some(Ok(fragment));
            }
            if !self.open {
                return None;
            }
            match self.inner.next().await {
                Some(Ok(chunk)) => self.ready.extend(self.assembler.push(&chunk)),
                Some(Err(err)) => {
                    self.open = false;
                    return Some(Err(err));
                }
                None => {
                    // Residue without a trailing newline is not a complete
                    // unit and is not delivered.
                    self.open = false;
                    return None;
                }
            }
        }
    }

    /// Collect every remaining fragment, stopping at the terminal failure.
    pub async fn collect_remaining(&mut self) -> Result<String, AnalyzeError> {
        let mut out = String::new();
        while let Some(fragment) = self.next_fragment().await {
            out.push_str(&fragment?);
        }
        Ok(out)
    }
}
