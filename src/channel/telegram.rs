use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::update::{TgUser, Update};
use super::{IdentityResolver, MessageSink, ReplyTarget};
use crate::config::TelegramConfig;
use crate::error::SendError;
use crate::types::{DispatchOutcome, OutcomeKind};

/// Bot API envelope: `{"ok": true, "result": ...}` or
/// `{"ok": false, "description": "..."}`.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// Telegram Bot API client. Delivers replies and resolves the bot's id.
pub struct TelegramClient {
    client: Client,
    /// `{api_base}/bot{token}/`, ready for a method name.
    base: String,
    bot_id: OnceCell<i64>,
}

impl TelegramClient {
    /// `timeout` bounds every request except long polls.
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let api_base = url::Url::parse(api_base)
            .map_err(|e| anyhow::anyhow!("invalid telegram api base '{api_base}': {e}"))?;
        if token.trim().is_empty() {
            anyhow::bail!("telegram bot token cannot be empty");
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: format!(
                "{}/bot{}/",
                api_base.as_str().trim_end_matches('/'),
                token.trim()
            ),
            bot_id: OnceCell::new(),
        })
    }

    /// Build from service config; fails when no token is available.
    pub fn from_config(config: &TelegramConfig) -> anyhow::Result<Self> {
        let token = config.token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "telegram bot token not configured. Set telegram.token or TELEGRAM_BOT_TOKEN."
            )
        })?;
        Ok(Self::new(&config.api_base, token, config.send_timeout())?.with_bot_id(config.bot_id))
    }

    /// Use a known bot id instead of asking `getMe`.
    pub fn with_bot_id(self, bot_id: Option<i64>) -> Self {
        if let Some(id) = bot_id {
            let _ = self.bot_id.set(id);
        }
        self
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, SendError> {
        let mut request = self.client.post(format!("{}{method}", self.base)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response: ApiResponse<T> = request.send().await?.json().await?;
        if !response.ok {
            let description = response.description.unwrap_or_else(|| {
                format!("error code {}", response.error_code.unwrap_or_default())
            });
            return Err(SendError::Api {
                method: method.to_string(),
                description,
            });
        }
        response.result.ok_or_else(|| SendError::Api {
            method: method.to_string(),
            description: "response carried no result".into(),
        })
    }

    pub async fn get_me(&self) -> Result<TgUser, SendError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, SendError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        // Leave the server room to answer an empty poll before we give up.
        let timeout = Duration::from_secs(timeout_secs + 10);
        self.call("getUpdates", &body, Some(timeout)).await
    }

    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<bool, SendError> {
        let mut body = serde_json::json!({
            "url": url,
            "allowed_updates": ["message"],
        });
        if let Some(secret) = secret_token {
            body["secret_token"] = serde_json::json!(secret);
        }
        self.call("setWebhook", &body, None).await
    }

    pub async fn delete_webhook(&self) -> Result<bool, SendError> {
        self.call("deleteWebhook", &serde_json::json!({}), None).await
    }
}

/// Bot API method and JSON body for an outcome.
pub fn send_request(outcome: &DispatchOutcome, target: ReplyTarget) -> (&'static str, serde_json::Value) {
    let (method, field) = match outcome.kind {
        OutcomeKind::Text => ("sendMessage", "text"),
        OutcomeKind::Sticker => ("sendSticker", "sticker"),
        OutcomeKind::Animation => ("sendAnimation", "animation"),
        OutcomeKind::Photo => ("sendPhoto", "photo"),
        OutcomeKind::Audio => ("sendAudio", "audio"),
        OutcomeKind::Voice => ("sendVoice", "voice"),
    };

    let mut body = serde_json::json!({ "chat_id": target.conversation_id });
    body[field] = serde_json::json!(outcome.payload);

    if let Some(caption) = &outcome.caption {
        if outcome.kind.accepts_caption() {
            body["caption"] = serde_json::json!(caption);
        } else if outcome.kind != OutcomeKind::Text {
            debug!(kind = %outcome.kind, "dropping caption unsupported by this kind");
        }
    }

    if let Some(message_id) = target.reply_to_message_id {
        body["reply_parameters"] = serde_json::json!({
            "message_id": message_id,
            "allow_sending_without_reply": true,
        });
    }

    (method, body)
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn send(&self, outcome: &DispatchOutcome, target: ReplyTarget) -> Result<(), SendError> {
        let (method, body) = send_request(outcome, target);
        let _: serde_json::Value = self.call(method, &body, None).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityResolver for TelegramClient {
    async fn bot_id(&self) -> Option<i64> {
        let result = self
            .bot_id
            .get_or_try_init(|| async { self.get_me().await.map(|me| me.id) })
            .await;
        match result {
            Ok(id) => Some(*id),
            Err(e) => {
                warn!("could not resolve bot identity: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ReplyTarget {
        ReplyTarget {
            conversation_id: -100,
            reply_to_message_id: Some(7),
        }
    }

    #[test]
    fn text_goes_to_send_message_as_a_reply() {
        let (method, body) = send_request(&DispatchOutcome::text("Vida de pcista"), target());
        assert_eq!(method, "sendMessage");
        assert_eq!(body["chat_id"], -100);
        assert_eq!(body["text"], "Vida de pcista");
        assert_eq!(body["reply_parameters"]["message_id"], 7);
    }

    #[test]
    fn photo_carries_caption() {
        let outcome = DispatchOutcome {
            kind: OutcomeKind::Photo,
            payload: "https://example.com/a.jpg".into(),
            caption: Some("olha".into()),
        };
        let (method, body) = send_request(&outcome, target());
        assert_eq!(method, "sendPhoto");
        assert_eq!(body["photo"], "https://example.com/a.jpg");
        assert_eq!(body["caption"], "olha");
    }

    #[test]
    fn sticker_drops_caption() {
        let outcome = DispatchOutcome {
            kind: OutcomeKind::Sticker,
            payload: "CAACAgIAAx".into(),
            caption: Some("ignored".into()),
        };
        let (method, body) = send_request(&outcome, target());
        assert_eq!(method, "sendSticker");
        assert!(body.get("caption").is_none());
    }

    #[test]
    fn rejects_bad_api_base() {
        assert!(TelegramClient::new("not a url", "123:abc", Duration::from_secs(1)).is_err());
    }
}
