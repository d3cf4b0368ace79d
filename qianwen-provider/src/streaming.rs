//! SSE streaming support for the DashScope completion endpoint.
//!
//! The response body is a `text/event-stream`:
//! ```text
//! id:1
//! event:result
//! :HTTP_STATUS/200
//! data:{"output":{"session_id":"...","finish_reason":"null","text":"Hel"},"request_id":"..."}
//!
//! id:2
//! event:result
//! :HTTP_STATUS/200
//! data:{"output":{"session_id":"...","finish_reason":"stop","text":"lo"},"request_id":"..."}
//! ```
//!
//! Only `data:` lines are interpreted. Network reads do not respect line
//! boundaries, so bytes are buffered until a newline arrives; a `data:` line
//! split across two reads is parsed once, whole.

use futures::{Stream, StreamExt};
use qianwen_types::{QianwenError, StreamSink};

use crate::types::StreamChunk;

/// How a single SSE line was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Empty or whitespace-only line.
    Blank,
    /// A `data:` line carrying an `output.text` fragment.
    Fragment(String),
    /// Not a `data:` line (`id:`, `event:`, comments). Skipped.
    Ignored,
    /// A `data:` line with invalid JSON or without `output.text`. Skipped;
    /// the stream continues.
    Malformed(String),
}

/// Interpret one SSE line.
pub fn classify_line(line: &str) -> SseLine {
    let line = line.trim();
    if line.is_empty() {
        return SseLine::Blank;
    }
    let Some(payload) = line.strip_prefix("data:") else {
        return SseLine::Ignored;
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return SseLine::Ignored;
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => {
            if let Some(text) = chunk.text() {
                return SseLine::Fragment(text.to_string());
            }
            match chunk.code {
                Some(code) => SseLine::Malformed(format!(
                    "error event {code}: {}",
                    chunk.message.unwrap_or_default()
                )),
                None => SseLine::Malformed("missing output.text".into()),
            }
        }
        Err(e) => SseLine::Malformed(format!("invalid JSON: {e}")),
    }
}

/// Longest line [`SseParser`] will buffer, in bytes.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Incremental SSE line splitter.
///
/// Bytes are kept until a `\n` arrives, so lines and multi-byte UTF-8
/// characters may straddle [`SseParser::feed`] calls. A line that grows past
/// [`MAX_LINE_BYTES`] is dropped through its terminating newline.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    discarding: bool,
}

impl SseParser {
    /// Parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the fragments of every line it completed.
    pub fn feed(&mut self, mut chunk: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.discarding {
            let Some(newline) = chunk.iter().position(|&b| b == b'\n') else {
                return fragments;
            };
            chunk = &chunk[newline + 1..];
            self.discarding = false;
        }

        let mut scanned = self.buffer.len();
        self.buffer.extend_from_slice(chunk);

        while let Some(offset) = self.buffer[scanned..].iter().position(|&b| b == b'\n') {
            let end = scanned + offset;
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            scanned = 0;
            if let Some(fragment) = decode_line(&line[..line.len() - 1]) {
                fragments.push(fragment);
            }
        }

        if self.buffer.len() > MAX_LINE_BYTES {
            tracing::debug!(len = self.buffer.len(), "dropping oversized SSE line");
            self.buffer = Vec::new();
            self.discarding = true;
        }

        fragments
    }

    /// Parse whatever is left in the buffer as a final, unterminated line.
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        if std::mem::take(&mut self.discarding) {
            return Vec::new();
        }
        decode_line(&rest).into_iter().collect()
    }

    /// Number of buffered bytes not yet forming a complete line.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Decode one line, dropping it if it is not valid UTF-8 or carries no fragment.
fn decode_line(bytes: &[u8]) -> Option<String> {
    let Ok(line) = std::str::from_utf8(bytes) else {
        tracing::debug!(len = bytes.len(), "dropping SSE line that is not valid UTF-8");
        return None;
    };
    match classify_line(line) {
        SseLine::Fragment(text) => Some(text),
        SseLine::Malformed(reason) => {
            tracing::debug!(%reason, "skipping malformed SSE data line");
            None
        }
        SseLine::Blank | SseLine::Ignored => None,
    }
}

/// Lifecycle of one streamed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// No bytes received yet.
    Idle,
    /// At least one chunk received, connection still open.
    Streaming,
    /// Closed. Terminal.
    Completed,
}

/// Per-request streaming state: line buffer, accumulated text, phase.
///
/// [`StreamState::close`] hands out the outcome exactly once, however many
/// close signals arrive.
#[derive(Debug)]
pub struct StreamState {
    parser: SseParser,
    full_text: String,
    phase: StreamPhase,
}

impl StreamState {
    /// Fresh state in [`StreamPhase::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: SseParser::new(),
            full_text: String::new(),
            phase: StreamPhase::Idle,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Text accumulated so far.
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Feed one network chunk. Returns the fragments it completed, in order.
    ///
    /// Chunks arriving after [`StreamState::close`] are ignored.
    pub fn on_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        match self.phase {
            StreamPhase::Completed => {
                tracing::trace!(len = chunk.len(), "ignoring chunk after stream completed");
                return Vec::new();
            }
            StreamPhase::Idle => self.phase = StreamPhase::Streaming,
            StreamPhase::Streaming => {}
        }
        tracing::trace!(len = chunk.len(), "received SSE chunk");
        let fragments = self.parser.feed(chunk);
        self.accumulate(&fragments);
        fragments
    }

    /// The connection closed cleanly: parse any unterminated trailing line.
    pub fn end_of_input(&mut self) -> Vec<String> {
        if self.phase == StreamPhase::Completed {
            return Vec::new();
        }
        let fragments = self.parser.finish();
        self.accumulate(&fragments);
        fragments
    }

    /// Close the stream, with the transport error if there was one.
    ///
    /// The first call returns the outcome: the accumulated text, or the error
    /// (partial text is discarded). Later calls return `None`. Buffers are
    /// released either way.
    pub fn close(&mut self, error: Option<QianwenError>) -> Option<Result<String, QianwenError>> {
        if self.phase == StreamPhase::Completed {
            return None;
        }
        self.phase = StreamPhase::Completed;
        let text = std::mem::take(&mut self.full_text);
        self.parser = SseParser::new();
        Some(match error {
            Some(err) => Err(err),
            None => Ok(text),
        })
    }

    /// Consume a state that was never closed and return its outcome.
    fn into_outcome(self, error: Option<QianwenError>) -> Result<String, QianwenError> {
        match error {
            Some(err) => Err(err),
            None => Ok(self.full_text),
        }
    }

    fn accumulate(&mut self, fragments: &[String]) {
        for fragment in fragments {
            self.full_text.push_str(fragment);
        }
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive a response byte stream to completion, forwarding fragments to `sink`.
///
/// Returns the concatenated text on a clean close, or
/// [`QianwenError::Network`] if the stream yielded an error. Only
/// [`StreamSink::on_fragment`] is called here; the caller reports loading
/// state and the completion.
pub async fn consume_stream<S, B, E, K>(byte_stream: S, sink: &mut K) -> Result<String, QianwenError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    K: StreamSink + ?Sized,
{
    let mut state = StreamState::new();
    let mut byte_stream = std::pin::pin!(byte_stream);
    let mut failure = None;

    while let Some(chunk) = byte_stream.next().await {
        match chunk {
            Ok(bytes) => {
                for fragment in state.on_chunk(bytes.as_ref()) {
                    sink.on_fragment(&fragment);
                }
            }
            Err(e) => {
                let err = QianwenError::network(e);
                tracing::warn!(error = %err, "stream read failed");
                failure = Some(err);
                break;
            }
        }
    }

    if failure.is_none() {
        for fragment in state.end_of_input() {
            sink.on_fragment(&fragment);
        }
    }

    state.into_outcome(failure)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
