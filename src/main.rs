use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use retort::catalog::Catalog;
use retort::channel::telegram::TelegramClient;
use retort::{config, gateway};

#[derive(Parser)]
#[command(name = "retort")]
#[command(about = "A keyword-triggered reply relay for chat platform webhooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Receive updates by long polling instead of a webhook
    Poll,

    /// Register the webhook URL with Telegram
    SetWebhook {
        /// Public HTTPS URL that Telegram should POST updates to
        url: String,
    },

    /// Validate a response catalog file
    Check {
        /// Catalog path (defaults to catalog.path from config)
        path: Option<PathBuf>,
    },

    /// Show runtime status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = config::load()?;

    match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(bind) = bind {
                config.gateway.bind = bind;
            }
            gateway::run(config).await
        }
        Commands::Poll => gateway::poll::run(config).await,
        Commands::SetWebhook { url } => {
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid webhook url '{url}': {e}"))?;
            let client = TelegramClient::from_config(&config.telegram)?;
            client
                .set_webhook(&url, config.gateway.secret_token.as_deref())
                .await?;
            println!("webhook set to {url}");
            Ok(())
        }
        Commands::Check { path } => {
            let path = path.unwrap_or(config.catalog.path);
            let catalog = Catalog::load(&path)?;
            println!("{}: ok", path.display());
            println!("  keyword rules:   {}", catalog.lookup_all().len());
            println!("  reply triggers:  {}", catalog.reply_triggers().len());
            println!("  generic replies: {}", catalog.generic_replies().len());
            Ok(())
        }
        Commands::Status => {
            println!("retort v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "gateway: {}:{}",
                config.gateway.bind, config.gateway.port
            );
            println!("catalog: {}", config.catalog.path.display());
            println!(
                "token: {}",
                if config.telegram.token.is_some() { "set" } else { "missing" }
            );
            Ok(())
        }
    }
}
