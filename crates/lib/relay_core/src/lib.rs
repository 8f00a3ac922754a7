//! # relay_core
//!
//! Core chat-completion logic for the chat relay.

pub mod completion;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
