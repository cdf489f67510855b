pub mod telegram;
pub mod update;

use async_trait::async_trait;

use crate::error::SendError;
use crate::types::{ConversationId, DispatchOutcome, InboundEvent};

/// Where a reply goes: the chat, and the message it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTarget {
    pub conversation_id: ConversationId,
    pub reply_to_message_id: Option<i64>,
}

impl ReplyTarget {
    pub fn for_event(event: &InboundEvent) -> Self {
        Self {
            conversation_id: event.conversation_id,
            reply_to_message_id: event.message_id,
        }
    }
}

/// Delivers a reply to the chat platform.
///
/// Implementations must tolerate repeated calls; callers do not retry.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, outcome: &DispatchOutcome, target: ReplyTarget) -> Result<(), SendError>;
}

/// Reports the bot's own user id, used to recognise replies to the bot.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn bot_id(&self) -> Option<i64>;
}

/// Identity known up front (from config, or in tests).
pub struct StaticIdentity(pub Option<i64>);

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn bot_id(&self) -> Option<i64> {
        self.0
    }
}
