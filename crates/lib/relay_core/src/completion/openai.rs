//! OpenAI-compatible chat-completion provider.
//!
//! Calls `{base_url}/chat/completions` with retry logic for transient
//! failures (rate limits, timeouts, 5xx) and exponential backoff. Rejected
//! credentials and other client errors are returned after a single attempt.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::config::CompletionConfig;
use super::models::{ChatMessage, Reply, Role};
use super::{ChatProvider, CompletionError};

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
    #[serde(default)]
    audio: Option<serde_json::Value>,
    #[serde(default)]
    function_call: Option<serde_json::Value>,
    #[serde(default)]
    tool_calls: Option<serde_json::Value>,
}

impl From<CompletionMessage> for Reply {
    fn from(message: CompletionMessage) -> Self {
        Reply {
            content: message.content,
            refusal: message.refusal,
            role: Role::Assistant,
            audio: message.audio,
            function_call: message.function_call,
            tool_calls: message.tool_calls,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat provider backed by an OpenAI-compatible HTTP API.
pub struct OpenAiProvider {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiProvider {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let url = Url::parse(&config.completions_url()).map_err(|e| {
            CompletionError::Config(format!("Invalid upstream URL '{}': {e}", config.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CompletionError::Config(format!(
                "Upstream URL must use http or https: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// One HTTP round trip, no retry.
    async fn attempt(&self, messages: &[ChatMessage]) -> Result<Reply, CompletionError> {
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&CompletionRequest {
                model: &self.config.model,
                messages,
            })
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let data: CompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(e.to_string())
            } else {
                CompletionError::InvalidResponse(format!("Response parse error: {e}"))
            }
        })?;

        data.choices
            .into_iter()
            .next()
            .map(|choice| Reply::from(choice.message))
            .ok_or_else(|| {
                CompletionError::InvalidResponse("Provider returned empty choices array".to_string())
            })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Reply, CompletionError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            debug!(
                model = %self.config.model,
                attempt = attempt + 1,
                messages = messages.len(),
                "sending chat completion"
            );

            let err = match self.attempt(messages).await {
                Ok(reply) => return Ok(reply),
                Err(e) => e,
            };

            if !err.is_transient() || attempt + 1 >= max_attempts {
                return Err(err);
            }

            let retry_after = match &err {
                CompletionError::RateLimited { retry_after, .. } => *retry_after,
                _ => None,
            };
            let backoff = self.config.backoff(attempt, retry_after);
            warn!(
                error = %err,
                attempt = attempt + 1,
                max_attempts,
                backoff_ms = backoff.as_millis() as u64,
                "transient chat completion failure, retrying"
            );
            sleep(backoff).await;
            attempt += 1;
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout(e.to_string())
    } else if e.is_builder() {
        CompletionError::Config(format!("Invalid upstream request: {e}"))
    } else {
        CompletionError::Unavailable(format!("Request failed: {e}"))
    }
}

async fn status_error(response: Response) -> CompletionError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    let message = error_message(&body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CompletionError::Config(format!("Provider rejected credentials ({status}): {message}"))
        }
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited {
            message,
            retry_after,
        },
        StatusCode::REQUEST_TIMEOUT => CompletionError::Timeout(format!("{status}: {message}")),
        s if s.is_server_error() => CompletionError::Unavailable(format!("{status}: {message}")),
        s if s.is_client_error() => CompletionError::Rejected {
            status: s.as_u16(),
            message,
        },
        s => CompletionError::InvalidResponse(format!("Unexpected status {s}: {message}")),
    }
}

/// Pull `error.message` out of an OpenAI error body, or fall back to a
/// truncated copy of the raw body.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<no body>".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
