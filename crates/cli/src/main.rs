use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "frgubot")]
#[command(about = "Frgubot CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook server (health page + Telegram update endpoint). Registers the webhook with Telegram when telegram.webhookUrl is set.
    Serve {
        /// Config file path (default: FRGUBOT_CONFIG_PATH or ~/.frgubot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 5000; PORT env overrides both)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Point the bot's Telegram webhook at a public URL.
    SetWebhook {
        /// Config file path (default: FRGUBOT_CONFIG_PATH or ~/.frgubot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Public HTTPS URL Telegram should deliver updates to (default: telegram.webhookUrl)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },

    /// Remove the bot's Telegram webhook registration.
    DeleteWebhook {
        /// Config file path (default: FRGUBOT_CONFIG_PATH or ~/.frgubot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("frgubot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::SetWebhook { config, url }) => {
            if let Err(e) = run_set_webhook(config, url).await {
                log::error!("set-webhook failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::DeleteWebhook { config }) => {
            if let Err(e) = run_delete_webhook(config).await {
                log::error!("delete-webhook failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!(
        "starting webhook server on {}:{}",
        config.server.bind,
        lib::config::resolve_port(&config)
    );
    lib::server::run_server(config).await
}

async fn run_set_webhook(
    config_path: Option<std::path::PathBuf>,
    url: Option<String>,
) -> anyhow::Result<()> {
    let config = lib::config::load_config(config_path)?;
    let url = url
        .or_else(|| config.telegram.webhook_url.clone())
        .context("no webhook url given (pass --url or set telegram.webhookUrl)")?;
    let token = lib::config::resolve_telegram_token(&config)
        .context("telegram bot token not configured (set TELEGRAM_TOKEN or telegram.botToken)")?;
    let client = lib::telegram::TelegramClient::new(token, config.telegram.api_base.clone());
    client
        .set_webhook(&url, config.telegram.webhook_secret.as_deref())
        .await?;
    println!("webhook set to {}", url);
    Ok(())
}

async fn run_delete_webhook(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let config = lib::config::load_config(config_path)?;
    let token = lib::config::resolve_telegram_token(&config)
        .context("telegram bot token not configured (set TELEGRAM_TOKEN or telegram.botToken)")?;
    let client = lib::telegram::TelegramClient::new(token, config.telegram.api_base.clone());
    client.delete_webhook().await?;
    println!("webhook removed");
    Ok(())
}
