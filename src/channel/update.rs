use serde::Deserialize;

use crate::types::{InboundEvent, RepliedMessage, SenderInfo};

/// Telegram `Update`, reduced to the fields the relay reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<TgUser>,
    pub chat: TgChat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub entities: Vec<TgEntity>,
    #[serde(default)]
    pub reply_to_message: Option<Box<TgMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl TgUser {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
}

/// Why an update produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    NoMessage,
    Command,
}

impl TgMessage {
    fn is_command(&self) -> bool {
        let first_entity_is_command = self
            .entities
            .first()
            .is_some_and(|e| e.kind == "bot_command" && e.offset == 0);
        first_entity_is_command || self.text.as_deref().is_some_and(|t| t.starts_with('/'))
    }
}

impl Update {
    /// Normalize into an [`InboundEvent`]. Commands are left to other bots.
    ///
    /// A captioned media message is matched on its caption.
    pub fn into_event(self) -> Result<InboundEvent, Ignored> {
        let message = self.message.ok_or(Ignored::NoMessage)?;
        if message.is_command() {
            return Err(Ignored::Command);
        }

        let sender = message
            .from
            .as_ref()
            .map(|u| SenderInfo {
                id: u.id,
                full_name: u.full_name(),
            })
            .unwrap_or_default();

        let replied_to = message.reply_to_message.map(|replied| {
            let replied = *replied;
            RepliedMessage {
                text: replied.text.or(replied.caption),
                sender_id: replied.from.map(|u| u.id),
            }
        });

        Ok(InboundEvent {
            text: message.text.or(message.caption),
            conversation_id: message.chat.id,
            message_id: Some(message.message_id),
            chat_kind: message.chat.kind,
            sender,
            replied_to,
        })
    }
}
