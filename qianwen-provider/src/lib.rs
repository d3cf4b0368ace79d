#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub(crate) mod error;
pub mod session;
pub mod streaming;
pub mod types;

pub use client::Qianwen;
pub use config::{ClientConfig, ConfigError};
pub use session::ChatSession;

// Re-export qianwen-types for convenience
pub use qianwen_types::{
    Callbacks, ConversationHistory, Message, QianwenError, Role, StreamSink,
};
