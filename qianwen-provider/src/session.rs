//! Conversational session: bounded history plus streamed prompt submission.

use qianwen_types::{ConversationHistory, Message, StreamSink};

use crate::client::Qianwen;
use crate::streaming::consume_stream;

/// A conversation with one DashScope application.
///
/// Owns its client and its [`ConversationHistory`]. Every request sends the
/// history (which already ends with the new prompt) so the model sees the
/// recent context. [`ChatSession::send`] borrows the session mutably, so one
/// session never has two requests racing on its history; use separate
/// sessions for independent conversations.
///
/// # Example
///
/// ```no_run
/// use qianwen_provider::{ChatSession, Qianwen};
/// use qianwen_types::Callbacks;
///
/// # async fn run() {
/// let mut session = ChatSession::new(Qianwen::new("sk-...", "app-id"))
///     .with_system_prompt("You are a calendar assistant.");
/// let mut sink = Callbacks::new().on_fragment(|text| print!("{text}"));
/// session.send("What's on tomorrow?", &mut sink).await;
/// # }
/// ```
#[derive(Debug)]
pub struct ChatSession {
    client: Qianwen,
    history: ConversationHistory,
}

impl ChatSession {
    /// Session with an empty history of the default capacity.
    pub fn new(client: Qianwen) -> Self {
        Self {
            client,
            history: ConversationHistory::new(),
        }
    }

    /// Replace the history with an empty one holding at most `capacity` messages.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = ConversationHistory::with_capacity(capacity);
        self
    }

    /// Pin a system message at the start of the conversation.
    #[must_use]
    pub fn with_system_prompt(mut self, content: impl Into<String>) -> Self {
        self.history.push(Message::system(content));
        self
    }

    /// The conversation so far, oldest first.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The underlying client.
    pub fn client(&self) -> &Qianwen {
        &self.client
    }

    /// Forget the whole conversation, system messages included.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Stream a completion for `prompt`, reporting progress to `sink`.
    ///
    /// The prompt is appended to the history first and stays there even if the
    /// request fails. Failures while building the request are reported through
    /// `on_complete` alone, before any I/O. Otherwise `on_loading(true)` is
    /// signaled, fragments are forwarded as they arrive, and the request ends
    /// with `on_loading(false)` followed by exactly one `on_complete`. On
    /// success the full text is also appended to the history as an assistant
    /// message.
    pub async fn send<K>(&mut self, prompt: impl Into<String>, sink: &mut K)
    where
        K: StreamSink + ?Sized,
    {
        self.history.push(Message::user(prompt));

        let request = match self.client.build_request(self.history.messages()) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "failed to build completion request");
                sink.on_complete(Err(err));
                return;
            }
        };

        tracing::debug!(
            url = %request.url(),
            messages = self.history.len(),
            "sending streaming completion request"
        );
        sink.on_loading(true);

        let outcome = match self.client.execute(request).await {
            Ok(response) => consume_stream(response.bytes_stream(), sink).await,
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(text) => {
                tracing::debug!(chars = text.chars().count(), "completion finished");
                self.history.push(Message::assistant(text.clone()));
            }
            Err(err) => tracing::warn!(error = %err, "completion failed"),
        }

        sink.on_loading(false);
        sink.on_complete(outcome);
    }
}
