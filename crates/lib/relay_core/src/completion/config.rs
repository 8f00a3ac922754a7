//! Upstream chat-completion configuration.

use std::time::Duration;

use super::CompletionError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Resolved configuration for the upstream provider.
#[derive(Clone)]
pub struct CompletionConfig {
    /// Bearer credential sent to the provider.
    pub api_key: String,
    /// API root, e.g. `https://api.openai.com/v1`. `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier used for every call.
    pub model: String,
    /// Bound on each HTTP attempt.
    pub timeout: Duration,
    /// Total attempts including the first. Transient failures only.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each later attempt.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl CompletionConfig {
    /// Config with defaults for everything except the credential.
    ///
    /// Fails when `api_key` is blank so a missing credential is caught at
    /// startup rather than on the first request.
    pub fn new(api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::Config(
                "OPENAI_API_KEY is required".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        })
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Delay to wait after failed attempt number `attempt` (zero-based).
    ///
    /// `retry_after` comes from the provider and may raise the delay, but
    /// never past `max_backoff`.
    pub fn backoff(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let exponential = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        let requested = retry_after.map(Duration::from_secs).unwrap_or_default();
        exponential.max(requested).min(self.max_backoff)
    }
}

// Keeps the credential out of logs.
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .finish()
    }
}
