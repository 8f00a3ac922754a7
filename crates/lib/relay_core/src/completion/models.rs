//! Chat messages and the normalized assistant reply.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }
}

/// The model's answer, normalized to the upstream message shape.
///
/// `content` is `None` when the model declined; `refusal` then usually
/// carries the explanation. `audio`, `function_call` and `tool_calls` are not
/// requested by the relay and pass through as whatever the provider sent
/// (normally null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub content: Option<String>,
    pub refusal: Option<String>,
    pub role: Role,
    pub audio: Option<serde_json::Value>,
    pub function_call: Option<serde_json::Value>,
    pub tool_calls: Option<serde_json::Value>,
}

impl Reply {
    /// An assistant reply carrying `content` and nothing else.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            refusal: None,
            role: Role::Assistant,
            audio: None,
            function_call: None,
            tool_calls: None,
        }
    }

    /// An assistant reply where the model declined to answer.
    pub fn refused(refusal: impl Into<String>) -> Self {
        Self {
            content: None,
            refusal: Some(refusal.into()),
            ..Self::assistant("")
        }
    }
}
