//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.frgubot/config.json`) and environment.
//! Environment variables win over file values so the bot can run on PaaS hosts
//! with nothing configured beyond env (the original deployment style).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram settings (bot token, webhook registration).
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// NLU (Dialogflow) settings.
    #[serde(default)]
    pub nlu: NluConfig,
}

/// Server bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook endpoint and liveness page (default 5000). Overridden by PORT env.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the webhook must be reachable from outside).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    5000
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Telegram settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    /// Bot token from BotFather. Overridden by TELEGRAM_TOKEN env when set. Required to serve.
    pub bot_token: Option<String>,
    /// Public URL Telegram should POST updates to. When set, the server registers it
    /// via setWebhook at startup and removes it at shutdown.
    pub webhook_url: Option<String>,
    /// Optional secret for webhook verification (X-Telegram-Bot-Api-Secret-Token).
    pub webhook_secret: Option<String>,
    /// Override the Bot API base URL (tests or a local API server). Default https://api.telegram.org.
    pub api_base: Option<String>,
}

/// NLU (Dialogflow) settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NluConfig {
    /// Dialogflow project id. Overridden by DIALOGFLOW_PROJECT_ID env when set. Required to serve.
    pub project_id: Option<String>,
    /// Bearer token for the Dialogflow REST API. Overridden by DIALOGFLOW_ACCESS_TOKEN env.
    /// When absent, requests go out unauthenticated and the service rejects them;
    /// the user then sees the fallback message.
    pub access_token: Option<String>,
    /// Override the Dialogflow endpoint (tests). Default https://dialogflow.googleapis.com.
    pub endpoint: Option<String>,
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn config_non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the Telegram bot token: env TELEGRAM_TOKEN overrides config.
pub fn resolve_telegram_token(config: &Config) -> Option<String> {
    env_non_empty("TELEGRAM_TOKEN").or_else(|| config_non_empty(config.telegram.bot_token.as_ref()))
}

/// Resolve the Dialogflow project id: env DIALOGFLOW_PROJECT_ID overrides config.
pub fn resolve_project_id(config: &Config) -> Option<String> {
    env_non_empty("DIALOGFLOW_PROJECT_ID").or_else(|| config_non_empty(config.nlu.project_id.as_ref()))
}

/// Resolve the Dialogflow bearer token: env DIALOGFLOW_ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    env_non_empty("DIALOGFLOW_ACCESS_TOKEN").or_else(|| config_non_empty(config.nlu.access_token.as_ref()))
}

/// Resolve the listening port: env PORT (when it parses) overrides config.
pub fn resolve_port(config: &Config) -> u16 {
    env_non_empty("PORT")
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.server.port)
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("FRGUBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".frgubot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or FRGUBOT_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}
