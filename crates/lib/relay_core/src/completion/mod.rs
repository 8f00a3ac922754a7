//! Chat-completion module — forwards a prompt to a hosted chat model.
//!
//! # Public API
//!
//! - [`ChatProvider`] — the seam handlers call; implemented by [`openai::OpenAiProvider`]
//! - [`prompt`] — builds the two-message prompt for a single user text
//! - [`config::CompletionConfig`] — upstream endpoint, model, timeout and retry settings
//! - [`models`] — chat messages and the normalized assistant [`models::Reply`]
//!
//! # Errors
//!
//! [`CompletionError::is_transient`] decides what the client retries. Rate
//! limits, timeouts and 5xx responses are transient; rejected credentials and
//! other 4xx responses are not.

pub mod config;
pub mod models;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use models::{ChatMessage, Reply};

/// Fixed system instruction placed ahead of every user turn.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Errors that can occur while calling the upstream provider.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Missing or rejected credential. Never retried.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Rate limited by provider: {message}")]
    RateLimited {
        message: String,
        /// Seconds from the provider's `Retry-After` header, if sent.
        retry_after: Option<u64>,
    },

    #[error("Provider timed out: {0}")]
    Timeout(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Timeout(_)
                | CompletionError::Unavailable(_)
        )
    }
}

/// A hosted chat-completion backend.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Submit `messages` and return the first reply choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Reply, CompletionError>;

    /// Model identifier used for every call.
    fn model(&self) -> &str;
}

/// Build the prompt for a single user text: the fixed system instruction
/// followed by `text` as the user turn, unmodified.
pub fn prompt(text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(text)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Role;

    #[test]
    fn prompt_has_system_then_user() {
        let messages = prompt("hello there");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "hello there");
    }

    #[test]
    fn prompt_keeps_user_text_verbatim() {
        let text = "  spaced\n\ttext with ünïcödé  ";
        let messages = prompt(text);
        assert_eq!(messages[1].content, text);
    }

    #[test]
    fn transient_classification() {
        assert!(
            CompletionError::RateLimited {
                message: "slow down".into(),
                retry_after: None,
            }
            .is_transient()
        );
        assert!(CompletionError::Timeout("t".into()).is_transient());
        assert!(CompletionError::Unavailable("503".into()).is_transient());

        assert!(!CompletionError::Config("bad key".into()).is_transient());
        assert!(
            !CompletionError::Rejected {
                status: 400,
                message: "bad".into(),
            }
            .is_transient()
        );
        assert!(!CompletionError::InvalidResponse("eof".into()).is_transient());
    }
}
