//! Delivery targets for a streamed completion.

use crate::error::QianwenError;

/// Receives the output of one streamed chat request.
///
/// All methods are called from the task that drives the request, one at a
/// time and in order. For a single request:
///
/// - `on_loading(true)` comes before the first `on_fragment`;
/// - `on_loading(false)` comes right before `on_complete`;
/// - `on_complete` is called exactly once.
pub trait StreamSink {
    /// One incremental piece of generated text (not the cumulative text).
    fn on_fragment(&mut self, fragment: &str);

    /// Reasoning output. Reserved: the stream does not drive it today.
    fn on_thinking(&mut self, _thought: &str) {}

    /// Loading state changed.
    fn on_loading(&mut self, loading: bool);

    /// Terminal outcome: the full response text, or the error that ended the request.
    fn on_complete(&mut self, result: Result<String, QianwenError>);
}

type TextFn = Box<dyn FnMut(&str) + Send>;
type LoadingFn = Box<dyn FnMut(bool) + Send>;
type CompleteFn = Box<dyn FnMut(Result<String, QianwenError>) + Send>;

/// A [`StreamSink`] assembled from closures.
///
/// Callbacks that are not set do nothing.
///
/// ```
/// use qianwen_types::{Callbacks, StreamSink};
///
/// let mut sink = Callbacks::new()
///     .on_fragment(|text| print!("{text}"))
///     .on_complete(|result| println!("\n{result:?}"));
/// StreamSink::on_fragment(&mut sink, "hello");
/// ```
#[derive(Default)]
pub struct Callbacks {
    fragment: Option<TextFn>,
    thinking: Option<TextFn>,
    loading: Option<LoadingFn>,
    complete: Option<CompleteFn>,
}

impl Callbacks {
    /// Callbacks with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment callback.
    #[must_use]
    pub fn on_fragment(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.fragment = Some(Box::new(f));
        self
    }

    /// Set the thinking callback.
    #[must_use]
    pub fn on_thinking(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.thinking = Some(Box::new(f));
        self
    }

    /// Set the loading-state callback.
    #[must_use]
    pub fn on_loading(mut self, f: impl FnMut(bool) + Send + 'static) -> Self {
        self.loading = Some(Box::new(f));
        self
    }

    /// Set the completion callback.
    #[must_use]
    pub fn on_complete(
        mut self,
        f: impl FnMut(Result<String, QianwenError>) + Send + 'static,
    ) -> Self {
        self.complete = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("fragment", &self.fragment.is_some())
            .field("thinking", &self.thinking.is_some())
            .field("loading", &self.loading.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

impl StreamSink for Callbacks {
    fn on_fragment(&mut self, fragment: &str) {
        if let Some(f) = self.fragment.as_mut() {
            f(fragment);
        }
    }

    fn on_thinking(&mut self, thought: &str) {
        if let Some(f) = self.thinking.as_mut() {
            f(thought);
        }
    }

    fn on_loading(&mut self, loading: bool) {
        if let Some(f) = self.loading.as_mut() {
            f(loading);
        }
    }

    fn on_complete(&mut self, result: Result<String, QianwenError>) {
        if let Some(f) = self.complete.as_mut() {
            f(result);
        }
    }
}
