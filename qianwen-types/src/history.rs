//! Capacity-bounded conversation history.

use crate::types::{Message, Role};

/// Number of messages kept by [`ConversationHistory::new`].
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Ordered, capacity-bounded log of chat messages.
///
/// Appending past capacity evicts the oldest message whose role is not
/// [`Role::System`]. System messages are pinned; they are only evicted when
/// nothing else is left to evict. Messages are never reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    capacity: usize,
}

impl ConversationHistory {
    /// Empty history holding at most [`DEFAULT_HISTORY_CAPACITY`] messages.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Empty history holding at most `capacity` messages.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Append a message, evicting one if the capacity is exceeded.
    ///
    /// Returns the evicted message, if any.
    pub fn push(&mut self, message: Message) -> Option<Message> {
        self.messages.push(message);
        if self.messages.len() <= self.capacity {
            return None;
        }
        let index = self
            .messages
            .iter()
            .position(|m| m.role() != Role::System)
            .unwrap_or(0);
        Some(self.messages.remove(index))
    }

    /// Remove every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of stored messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum number of stored messages.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate over stored messages, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_ten() {
        let history = ConversationHistory::default();
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(history.capacity(), 10);
        assert!(history.is_empty());
    }

    #[test]
    fn push_within_capacity_keeps_everything() {
        let mut history = ConversationHistory::with_capacity(3);
        assert!(history.push(Message::user("a")).is_none());
        assert!(history.push(Message::assistant("b")).is_none());
        assert!(history.push(Message::user("c")).is_none());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn overflow_evicts_oldest_message() {
        let mut history = ConversationHistory::with_capacity(2);
        history.push(Message::user("a"));
        history.push(Message::assistant("b"));
        let evicted = history.push(Message::user("c"));
        assert_eq!(evicted, Some(Message::user("a")));
        let contents: Vec<&str> = history.iter().map(Message::content).collect();
        assert_eq!(contents, vec!["b", "c"]);
    }

    #[test]
    fn system_messages_are_pinned() {
        let mut history = ConversationHistory::with_capacity(3);
        history.push(Message::system("rules"));
        history.push(Message::user("a"));
        history.push(Message::assistant("b"));
        let evicted = history.push(Message::user("c"));
        assert_eq!(evicted, Some(Message::user("a")));
        assert_eq!(history.messages()[0], Message::system("rules"));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn only_system_messages_evicts_oldest() {
        let mut history = ConversationHistory::with_capacity(2);
        history.push(Message::system("one"));
        history.push(Message::system("two"));
        let evicted = history.push(Message::system("three"));
        assert_eq!(evicted, Some(Message::system("one")));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = ConversationHistory::with_capacity(0);
        let evicted = history.push(Message::user("a"));
        assert_eq!(evicted, Some(Message::user("a")));
        assert!(history.is_empty());
    }

    #[test]
    fn clear_empties_history() {
        let mut history = ConversationHistory::new();
        history.push(Message::system("s"));
        history.push(Message::user("u"));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn order_is_preserved_across_evictions() {
        let mut history = ConversationHistory::with_capacity(4);
        history.push(Message::user("u1"));
        history.push(Message::system("s"));
        for i in 2..8 {
            history.push(Message::user(format!("u{i}")));
        }
        let contents: Vec<&str> = (&history).into_iter().map(Message::content).collect();
        assert_eq!(contents, vec!["s", "u5", "u6", "u7"]);
    }
}
