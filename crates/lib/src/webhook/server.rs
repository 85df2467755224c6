//! Webhook HTTP server: GET verification handshake and POST event delivery on any path.

use crate::api::Client;
use crate::config::{self, Config, ServerConfig};
use crate::webhook::events::WebhookBody;
use crate::webhook::handler::{dispatch, MessageHandler};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
struct WebhookState {
    verify_token: Arc<str>,
    handler: Arc<dyn MessageHandler>,
}

/// Messenger bot: owns the outbound [`Client`] and routes webhook messages to a handler.
#[derive(Clone)]
pub struct Messenger {
    client: Client,
    verify_token: Arc<str>,
    handler: Arc<dyn MessageHandler>,
    server: ServerConfig,
}

impl Messenger {
    pub fn new(client: Client, verify_token: impl Into<String>, handler: impl MessageHandler) -> Self {
        Self {
            client,
            verify_token: Arc::from(verify_token.into()),
            handler: Arc::new(handler),
            server: ServerConfig::default(),
        }
    }

    /// Build from config: resolves the verify token and listener settings.
    pub fn from_config(config: &Config, client: Client, handler: impl MessageHandler) -> Result<Self> {
        let verify_token = config::resolve_verify_token(config)
            .context("verify token not configured (set verifyToken or FB_VERIFY_TOKEN)")?;
        Ok(Self::new(client, verify_token, handler).with_server(config.server.clone()))
    }

    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// The outbound client, for replies outside the handler.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Router answering GET (verification) and POST (events) on every path.
    pub fn router(&self) -> Router {
        let state = WebhookState {
            verify_token: self.verify_token.clone(),
            handler: self.handler.clone(),
        };
        Router::new()
            .route("/", get(verify).post(receive))
            .route("/*tail", get(verify).post(receive))
            .with_state(state)
    }

    /// Bind `server.bind:server.port` and serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.server.bind.trim(), self.server.port);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("binding to {}", bind_addr))?;
        log::info!("webhook listening on {}", bind_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("webhook server exited")?;
        log::info!("webhook stopped");
        Ok(())
    }
}

/// GET — echo `hub.challenge` when `hub.verify_token` matches.
async fn verify(
    State(state): State<WebhookState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    log::debug!("received verification request");
    if params.get("hub.verify_token").map(String::as_str) != Some(&*state.verify_token) {
        log::warn!("webhook verification rejected: verify token mismatch");
        return (StatusCode::FORBIDDEN, "Verify token is invalid").into_response();
    }
    match params.get("hub.challenge").filter(|c| !c.is_empty()) {
        Some(challenge) => (StatusCode::OK, challenge.clone()).into_response(),
        None => (StatusCode::BAD_REQUEST, "hub.challenge not set").into_response(),
    }
}

/// POST — parse events, schedule the handler per message, and acknowledge without waiting.
async fn receive(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    log::debug!("received webhook body: {}", String::from_utf8_lossy(&body));
    let body: WebhookBody = match serde_json::from_slice(&body) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("webhook body is not a valid event payload: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    for message in body.messages() {
        dispatch(state.handler.clone(), message);
    }
    StatusCode::OK
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
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
    log::info!("shutdown signal received");
}
