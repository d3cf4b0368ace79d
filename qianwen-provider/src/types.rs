//! DashScope application completion request/response types.
//!
//! Request body:
//! ```json
//! { "input": { "messages": [{"role": "user", "content": "hi"}] },
//!   "parameters": { "incremental_output": true } }
//! ```
//!
//! Each streamed `data:` line carries one event:
//! ```json
//! { "output": { "text": "Hel", "finish_reason": "null" }, "request_id": "..." }
//! ```
//! With `incremental_output` enabled, `output.text` is the new fragment only.

use qianwen_types::Message;
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/v1/apps/{app_id}/completion`.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    /// Prompt input.
    pub input: CompletionInput<'a>,
    /// Generation parameters.
    pub parameters: CompletionParameters,
}

/// The `input` object of a completion request.
#[derive(Debug, Serialize)]
pub struct CompletionInput<'a> {
    /// Conversation messages, oldest first, ending with the new prompt.
    pub messages: &'a [Message],
}

/// The `parameters` object of a completion request.
#[derive(Debug, Serialize)]
pub struct CompletionParameters {
    /// Stream only the new text in each event instead of the cumulative text.
    pub incremental_output: bool,
}

impl<'a> CompletionRequest<'a> {
    /// Streaming request over `messages` with incremental output enabled.
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            input: CompletionInput { messages },
            parameters: CompletionParameters {
                incremental_output: true,
            },
        }
    }
}

/// One decoded `data:` payload.
///
/// Only `output.text` matters for streaming; `code` and `message` are set on
/// DashScope error events and are kept for logging.
#[derive(Debug, Default, Deserialize)]
pub struct StreamChunk {
    /// Generated output, absent on error events.
    #[serde(default)]
    pub output: Option<ChunkOutput>,
    /// Error code on failure events.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message on failure events.
    #[serde(default)]
    pub message: Option<String>,
}

/// The `output` object of a streamed event.
#[derive(Debug, Default, Deserialize)]
pub struct ChunkOutput {
    /// Incremental text fragment.
    #[serde(default)]
    pub text: Option<String>,
}

impl StreamChunk {
    /// The text fragment carried by this event, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.text.as_deref())
    }
}
