use serde::{Deserialize, Serialize};

/// Chat identifier as the platform reports it.
pub type ConversationId = i64;

/// One possible reply payload. At least one content field is set once the
/// catalog has accepted it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl ReplyCandidate {
    /// A text-only candidate.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn has_content(&self) -> bool {
        self.text.is_some()
            || self.sticker.is_some()
            || self.animation.is_some()
            || self.photo.is_some()
            || self.audio.is_some()
            || self.voice.is_some()
    }

    /// The media attachment that wins under sticker > animation > photo >
    /// audio > voice, if any.
    pub fn media(&self) -> Option<(OutcomeKind, &str)> {
        [
            (OutcomeKind::Sticker, &self.sticker),
            (OutcomeKind::Animation, &self.animation),
            (OutcomeKind::Photo, &self.photo),
            (OutcomeKind::Audio, &self.audio),
            (OutcomeKind::Voice, &self.voice),
        ]
        .into_iter()
        .find_map(|(kind, value)| value.as_deref().map(|v| (kind, v)))
    }
}

/// What kind of message a [`DispatchOutcome`] asks the sink to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Text,
    Sticker,
    Animation,
    Photo,
    Audio,
    Voice,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Sticker => "sticker",
            Self::Animation => "animation",
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Voice => "voice",
        }
    }

    /// Whether the platform accepts a caption alongside this kind.
    pub fn accepts_caption(&self) -> bool {
        matches!(
            self,
            Self::Animation | Self::Photo | Self::Audio | Self::Voice
        )
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized reply handed to a [`crate::channel::MessageSink`].
///
/// `payload` is the text for [`OutcomeKind::Text`] and a file reference
/// (file id or URL) for every media kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub kind: OutcomeKind,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl DispatchOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Text,
            payload: text.into(),
            caption: None,
        }
    }
}

/// Who sent an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
}

/// The message an inbound message is replying to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepliedMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub sender_id: Option<i64>,
}

/// Platform-neutral inbound message consumed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub text: Option<String>,
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default = "default_chat_kind")]
    pub chat_kind: String,
    #[serde(default)]
    pub sender: SenderInfo,
    #[serde(default)]
    pub replied_to: Option<RepliedMessage>,
}

fn default_chat_kind() -> String {
    "private".into()
}

impl InboundEvent {
    /// A plain, non-reply text message.
    pub fn text(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            conversation_id,
            message_id: None,
            chat_kind: default_chat_kind(),
            sender: SenderInfo::default(),
            replied_to: None,
        }
    }

    /// Mark this event as a reply to a message authored by `sender_id`.
    pub fn replying_to(mut self, sender_id: i64, text: impl Into<String>) -> Self {
        self.replied_to = Some(RepliedMessage {
            text: Some(text.into()),
            sender_id: Some(sender_id),
        });
        self
    }
}
