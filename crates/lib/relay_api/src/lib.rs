//! # relay_api
//!
//! HTTP API library for the chat relay.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use relay_core::completion::ChatProvider;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{chat, health};

pub const CHAT_PATH: &str = "/chat";
pub const HEALTH_PATH: &str = "/health";

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Upstream chat-completion backend.
    pub provider: Arc<dyn ChatProvider>,
}

impl AppState {
    pub fn new(config: ApiConfig, provider: Arc<dyn ChatProvider>) -> Self {
        Self { config, provider }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route(HEALTH_PATH, get(health::health_handler))
        .route(CHAT_PATH, post(chat::chat_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser access is limited to the configured origins. Allowed origins may
/// send credentials and any method or header; an empty list denies all.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.iter().cloned()))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
