use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::memory::ConversationMemory;
use crate::resolver::MatchResolver;
use crate::selector::ReplySelector;
use crate::types::{DispatchOutcome, InboundEvent};

/// Inbound message → matching rule → chosen reply.
///
/// Owns the repetition memory; the catalog is shared read-only.
pub struct ReplyEngine {
    catalog: Arc<Catalog>,
    memory: ConversationMemory,
}

impl ReplyEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            memory: ConversationMemory::new(),
        }
    }

    /// Repetition history, for inspecting what has been picked.
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Produce the reply for `event`, or `None` when nothing should be sent.
    ///
    /// `bot_id` is this bot's own user id; without it no message can be
    /// recognised as a reply to the bot.
    pub async fn handle(&self, event: &InboundEvent, bot_id: Option<i64>) -> Option<DispatchOutcome> {
        let mut rng = StdRng::from_entropy();
        self.handle_with_rng(event, bot_id, &mut rng).await
    }

    pub async fn handle_with_rng<R: Rng + Send>(
        &self,
        event: &InboundEvent,
        bot_id: Option<i64>,
        rng: &mut R,
    ) -> Option<DispatchOutcome> {
        let resolution = match MatchResolver::new(&self.catalog).resolve(event, bot_id) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(chat = event.conversation_id, "ignoring message: {e}");
                return None;
            }
        };

        info!(
            chat = event.conversation_id,
            chat_kind = %event.chat_kind,
            user = %event.sender.full_name,
            user_id = event.sender.id,
            text = event.text.as_deref().unwrap_or_default(),
            "message received"
        );

        let Some(resolution) = resolution else {
            debug!(chat = event.conversation_id, "no rule matched");
            return None;
        };

        let outcome = ReplySelector::new(&self.memory)
            .select(event.conversation_id, &resolution, rng)
            .await;

        if let Some(outcome) = &outcome {
            debug!(
                chat = event.conversation_id,
                matched_by = resolution.matched_by,
                kind = %outcome.kind,
                "reply selected"
            );
        }
        outcome
    }
}
