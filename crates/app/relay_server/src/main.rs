//! Chat relay server binary.
//!
//! Reads configuration from flags or the environment (a `.env` file is loaded
//! first if present), refuses to start without an upstream credential, and
//! serves the relay API until Ctrl-C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use relay_api::AppState;
use relay_api::config::ApiConfig;
use relay_core::completion::config::{
    CompletionConfig, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL,
};
use relay_core::completion::openai::OpenAiProvider;
use tracing::info;

/// CLI arguments for the relay server.
#[derive(Parser, Debug)]
#[command(name = "relay_server", about = "Chat relay server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind_addr: String,

    /// Upstream provider API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream API root; `/chat/completions` is appended.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    upstream_url: String,

    /// Model identifier sent with every completion.
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Comma-separated origins allowed to call the API from a browser.
    ///
    /// Empty (the default) denies all cross-origin browser access.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Per-attempt timeout for upstream calls, in seconds.
    #[arg(
        long,
        env = "UPSTREAM_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// Total upstream attempts for transient failures (rate limits, 5xx, timeouts).
    #[arg(
        long,
        env = "UPSTREAM_MAX_ATTEMPTS",
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_attempts: u32,
}

/// Validate configuration and assemble the shared application state.
fn build_state(args: Args) -> Result<AppState, Box<dyn std::error::Error>> {
    let mut completion = CompletionConfig::new(args.api_key.unwrap_or_default())?;
    completion.base_url = args.upstream_url;
    completion.model = args.model;
    completion.timeout = Duration::from_secs(args.timeout_secs);
    completion.max_attempts = args.max_attempts;

    let config = ApiConfig::new(args.bind_addr, args.allowed_origins.as_slice())?;

    info!(
        upstream = %completion.base_url,
        model = %completion.model,
        timeout_secs = completion.timeout.as_secs(),
        max_attempts = completion.max_attempts,
        allowed_origins = config.allowed_origins.len(),
        "configuring relay"
    );

    let provider = OpenAiProvider::new(completion)?;
    Ok(AppState::new(config, Arc::new(provider)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relay_api=debug,relay_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let state = build_state(args)?;

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let app = relay_api::router(state);

    info!(addr = %local_addr, "relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("relay stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["relay_server"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("valid args")
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn origins_split_on_commas() {
        let args = parse(&[
            "--api-key",
            "sk-test",
            "--allowed-origins",
            "http://localhost:3000,https://app.example.com",
        ]);
        assert_eq!(
            args.allowed_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn blank_api_key_fails_fast() {
        let args = parse(&["--api-key", "  "]);
        assert!(build_state(args).is_err());
    }

    #[test]
    fn malformed_upstream_url_fails_fast() {
        let args = parse(&["--api-key", "sk-test", "--upstream-url", "not a url"]);
        assert!(build_state(args).is_err());
    }

    #[test]
    fn zero_timeout_and_attempts_rejected() {
        for flag in ["--timeout-secs", "--max-attempts"] {
            let result =
                Args::try_parse_from(["relay_server", "--api-key", "sk-test", flag, "0"]);
            assert!(result.is_err(), "{flag} 0 should be rejected");
        }
    }

    #[test]
    fn wildcard_origin_fails_fast() {
        let args = parse(&["--api-key", "sk-test", "--allowed-origins", "*"]);
        assert!(build_state(args).is_err());
    }

    #[test]
    fn state_uses_configured_model() {
        let args = parse(&["--api-key", "sk-test", "--model", "gpt-4o"]);
        let state = build_state(args).expect("valid config");
        assert_eq!(state.provider.model(), "gpt-4o");
    }
}
