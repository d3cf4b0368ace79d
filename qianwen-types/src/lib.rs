#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod error;
pub mod history;
pub mod sink;
pub mod types;

pub use error::*;
pub use history::*;
pub use sink::*;
pub use types::*;
