use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use super::auth;
use crate::catalog::Catalog;
use crate::channel::telegram::TelegramClient;
use crate::channel::update::{Ignored, Update};
use crate::channel::{IdentityResolver, MessageSink, ReplyTarget};
use crate::config::RetortConfig;
use crate::engine::ReplyEngine;

pub struct AppState {
    pub engine: ReplyEngine,
    pub sink: Arc<dyn MessageSink>,
    pub identity: Arc<dyn IdentityResolver>,
    pub secret_token: Option<String>,
    pub send_timeout: Duration,
}

impl AppState {
    pub fn new(
        engine: ReplyEngine,
        sink: Arc<dyn MessageSink>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            engine,
            sink,
            identity,
            secret_token: None,
            send_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_secret_token(mut self, secret_token: Option<String>) -> Self {
        self.secret_token = secret_token;
        self
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Wire catalog, engine and Telegram client from config.
    pub fn from_config(config: &RetortConfig) -> anyhow::Result<(Self, Arc<TelegramClient>)> {
        let client = Arc::new(TelegramClient::from_config(&config.telegram)?);
        let catalog = Arc::new(Catalog::load_or_empty(&config.catalog.path));

        let state = Self::new(
            ReplyEngine::new(catalog),
            Arc::clone(&client) as Arc<dyn MessageSink>,
            Arc::clone(&client) as Arc<dyn IdentityResolver>,
        )
        .with_secret_token(config.gateway.secret_token.clone())
        .with_send_timeout(config.telegram.send_timeout());

        Ok((state, client))
    }
}

pub async fn run(config: RetortConfig) -> anyhow::Result<()> {
    let (state, _client) = AppState::from_config(&config)?;

    if !config.gateway.is_loopback() && state.secret_token.is_none() {
        warn!(
            "binding to {} without a webhook secret; set gateway.secret_token or RETORT_SECRET_TOKEN",
            config.gateway.bind
        );
    }

    let addr = format!("{}:{}", config.gateway.bind, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("retort gateway listening on {addr}");

    serve(listener, Arc::new(state)).await
}

/// Serve the webhook routes on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    axum::serve(listener, app(state)).await?;
    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(endpoint_status).post(webhook_handler))
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Answer browser checks and webhook registration probes.
async fn endpoint_status() -> Json<Value> {
    info!("GET on webhook endpoint");
    Json(json!({
        "status": "ok",
        "message": "Webhook endpoint is live. Send POST requests for Telegram updates.",
    }))
}

/// Handle an update pushed by the platform.
///
/// Every well-formed update is acknowledged with 200, whether or not a
/// reply was sent, so the platform does not redeliver it.
async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if !auth::verify_secret(&headers, &state.secret_token) {
        warn!("webhook call with missing or wrong secret token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "error", "message": "Invalid secret token"})),
        );
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            error!("no valid update in POST body: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "message": "Invalid JSON"})),
            );
        }
    };

    process_update(&state, update).await;
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Run one update through the engine and deliver the reply, if any.
///
/// Shared by the webhook and the long-polling loop.
pub async fn process_update(state: &AppState, update: Update) {
    let update_id = update.update_id;
    let event = match update.into_event() {
        Ok(event) => event,
        Err(Ignored::NoMessage) => {
            warn!(update_id, "update received without a message");
            return;
        }
        Err(Ignored::Command) => {
            debug!(update_id, "ignoring bot command");
            return;
        }
    };

    // Only replies need to know who the bot is.
    let bot_id = if event.replied_to.is_some() {
        state.identity.bot_id().await
    } else {
        None
    };

    let Some(outcome) = state.engine.handle(&event, bot_id).await else {
        return;
    };

    let target = ReplyTarget::for_event(&event);
    match tokio::time::timeout(state.send_timeout, state.sink.send(&outcome, target)).await {
        Ok(Ok(())) => info!(chat = target.conversation_id, kind = %outcome.kind, "reply sent"),
        Ok(Err(e)) => warn!(chat = target.conversation_id, kind = %outcome.kind, "reply failed: {e}"),
        Err(_) => warn!(chat = target.conversation_id, kind = %outcome.kind, "reply timed out"),
    }
}
