use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Top-level configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RetortConfig {
    pub gateway: GatewayConfig,
    pub telegram: TelegramConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` header value.
    pub secret_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            secret_token: None,
        }
    }
}

impl GatewayConfig {
    pub fn is_loopback(&self) -> bool {
        self.bind == "127.0.0.1" || self.bind == "::1" || self.bind == "localhost"
    }
}

fn default_port() -> u16 {
    8080
}
fn default_bind() -> String {
    "127.0.0.1".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Skip the `getMe` lookup when the bot's user id is already known.
    pub bot_id: Option<i64>,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_api_base(),
            bot_id: None,
            send_timeout_secs: default_send_timeout_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl TelegramConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".into()
}
fn default_send_timeout_secs() -> u64 {
    10
}
fn default_poll_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("respostas.json")
}

/// Load configuration from file or use defaults.
///
/// Search order:
/// 1. `RETORT_CONFIG` env var
/// 2. `~/.retort/config.toml`
/// 3. Zero-config defaults (no file needed)
///
/// Environment overrides are applied afterwards.
pub fn load() -> anyhow::Result<RetortConfig> {
    let path = config_path();

    let mut config = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let config = parse(&content)
            .map_err(|e| anyhow::anyhow!("invalid config at {}: {e}", path.display()))?;
        info!("loaded config from {}", path.display());
        config
    } else {
        info!("no config file found, using zero-config defaults");
        RetortConfig::default()
    };

    apply_env(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Parse and validate a TOML document, without environment overrides.
pub fn parse(content: &str) -> anyhow::Result<RetortConfig> {
    let config: RetortConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("RETORT_CONFIG") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".retort").join("config.toml")
}

/// Fill secrets from the environment and honour a platform-assigned `PORT`.
fn apply_env(config: &mut RetortConfig) {
    if config.telegram.token.is_none() {
        config.telegram.token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
    }
    if config.gateway.secret_token.is_none() {
        config.gateway.secret_token = std::env::var("RETORT_SECRET_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
    }
    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
        config.gateway.port = port;
    }
}

/// Validate the config and return clear error messages.
fn validate(config: &RetortConfig) -> anyhow::Result<()> {
    if let Err(e) = url::Url::parse(&config.telegram.api_base) {
        anyhow::bail!(
            "telegram.api_base '{}' is not a valid url: {e}",
            config.telegram.api_base
        );
    }

    if config.telegram.send_timeout_secs == 0 {
        anyhow::bail!("telegram.send_timeout_secs must be > 0");
    }

    if let Some(id) = config.telegram.bot_id {
        if id <= 0 {
            anyhow::bail!("telegram.bot_id must be a positive user id, got {id}");
        }
    }

    if config.catalog.path.as_os_str().is_empty() {
        anyhow::bail!("catalog.path cannot be empty");
    }

    Ok(())
}
