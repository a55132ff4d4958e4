//! Webhook HTTP server: liveness page plus the Telegram update endpoint.
//!
//! Updates are dispatched inline in the request path: the reply (greeting or
//! NLU output) is sent to the chat before the webhook request is answered.
//! The response is a fixed acknowledgment either way; Telegram gets no signal
//! about downstream delivery.

use crate::config::{self, Config};
use crate::nlu::DialogflowClient;
use crate::resolver::IntentResolver;
use crate::telegram::{TelegramClient, TelegramUpdate};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Html,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Greeting for the /start command; sent without consulting the NLU service.
const START_GREETING: &str = "Здравствуйте! Я ваш бот-помощник в работе с ФРГУ!";

/// Fixed webhook acknowledgment body.
const WEBHOOK_ACK: &str = "ok";

/// Liveness page for GET /.
const LIVENESS_HTML: &str = "<h1>Бот работает!</h1>";

/// Shared state for the webhook server (config, Telegram client, intent resolver).
/// Built once at startup; read-only afterwards.
#[derive(Clone)]
pub struct BotState {
    pub config: Arc<Config>,
    pub telegram: TelegramClient,
    pub resolver: IntentResolver,
}

/// Build the shared state from config. Fails when a required value (bot token,
/// NLU project id) is missing; the server must not start half-configured.
pub fn build_state(config: Config) -> Result<BotState> {
    let token = config::resolve_telegram_token(&config)
        .context("telegram bot token not configured (set TELEGRAM_TOKEN or telegram.botToken)")?;
    let project_id = config::resolve_project_id(&config)
        .context("dialogflow project id not configured (set DIALOGFLOW_PROJECT_ID or nlu.projectId)")?;
    let access_token = config::resolve_access_token(&config);
    let telegram = TelegramClient::new(token, config.telegram.api_base.clone());
    let dialogflow = DialogflowClient::new(project_id, access_token, config.nlu.endpoint.clone());
    Ok(BotState {
        config: Arc::new(config),
        telegram,
        resolver: IntentResolver::new(dialogflow),
    })
}

/// Route one parsed update to its handler. A /start command gets the fixed greeting;
/// any other non-command text gets exactly one reply with the resolver's output.
/// Other commands and non-text updates are ignored.
async fn handle_update(state: &BotState, update: TelegramUpdate) {
    let Some(msg) = update.message else {
        log::debug!("update {} has no message, ignoring", update.update_id);
        return;
    };
    match msg.command() {
        Some("start") => {
            if let Err(e) = state.telegram.send_message(msg.chat.id, START_GREETING).await {
                log::warn!("greeting send failed: {}", e);
            }
        }
        Some(other) => {
            log::debug!("unknown command /{}, ignoring", other);
        }
        None => {
            let Some(ref text) = msg.text else {
                log::debug!("update {} has no text, ignoring", update.update_id);
                return;
            };
            let reply = state.resolver.resolve(text, msg.sender_id()).await;
            if let Err(e) = state.telegram.send_message(msg.chat.id, &reply).await {
                log::warn!("reply send failed: {}", e);
            }
        }
    }
}

/// POST /webhook: one Telegram update per request. Verifies the optional secret,
/// parses the body, dispatches inline, and acknowledges with the fixed body.
/// Downstream send failures never change the status; a body that does not parse
/// as an update gets a 400.
async fn telegram_webhook(
    State(state): State<BotState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if let Some(ref expected) = state.config.telegram.webhook_secret {
        let provided = headers
            .get("X-Telegram-Bot-Api-Secret-Token")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided != expected.as_str() {
            return (StatusCode::FORBIDDEN, "forbidden");
        }
    }
    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            log::debug!("webhook body did not parse as an update: {}", e);
            return (StatusCode::BAD_REQUEST, "bad request");
        }
    };
    handle_update(&state, update).await;
    (StatusCode::OK, WEBHOOK_ACK)
}

/// GET /: static liveness page.
async fn liveness() -> Html<&'static str> {
    Html(LIVENESS_HTML)
}

/// Run the webhook server; binds to config.server.bind (PORT env overrides the
/// configured port). Registers the webhook with Telegram when telegram.webhookUrl
/// is set and removes it again on shutdown. Blocks until SIGINT/SIGTERM.
pub async fn run_server(config: Config) -> Result<()> {
    let port = config::resolve_port(&config);
    let bind = config.server.bind.trim().to_string();
    let webhook_url = config.telegram.webhook_url.clone();
    let webhook_secret = config.telegram.webhook_secret.clone();
    let state = build_state(config)?;

    if let Some(ref url) = webhook_url {
        match state
            .telegram
            .set_webhook(url, webhook_secret.as_deref())
            .await
        {
            Ok(()) => log::info!("telegram webhook registered: {}", url),
            Err(e) => log::warn!("telegram set_webhook failed: {}", e),
        }
    }
    let telegram_for_shutdown = webhook_url.is_some().then(|| state.telegram.clone());

    let app = Router::new()
        .route("/", get(liveness))
        .route("/webhook", post(telegram_webhook))
        .with_state(state);

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("webhook server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(telegram_for_shutdown))
        .await
        .context("webhook server exited")?;
    log::info!("webhook server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// Removes the Telegram webhook registration when one was set at startup.
async fn shutdown_signal(telegram: Option<TelegramClient>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");

    if let Some(t) = telegram {
        if let Err(e) = t.delete_webhook().await {
            log::debug!("telegram delete_webhook on shutdown: {}", e);
        }
    }
}
