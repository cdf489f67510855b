pub mod recent;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::types::ConversationId;
pub use recent::RecentPicks;

/// Recent picks per rule identity within one conversation.
pub type RuleHistory = HashMap<String, RecentPicks>;

/// Process-local repetition memory, one entry per conversation.
///
/// Each conversation sits behind its own mutex so that two events for the
/// same chat cannot interleave their read-pick-record sequence, while
/// different chats proceed independently. Nothing is persisted; a restart
/// starts every conversation fresh.
#[derive(Default)]
pub struct ConversationMemory {
    conversations: RwLock<HashMap<ConversationId, Arc<Mutex<RuleHistory>>>>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to a conversation's history, created on first use.
    pub async fn conversation(&self, id: ConversationId) -> Arc<Mutex<RuleHistory>> {
        {
            let conversations = self.conversations.read().await;
            if let Some(history) = conversations.get(&id) {
                return Arc::clone(history);
            }
        }

        let mut conversations = self.conversations.write().await;
        Arc::clone(conversations.entry(id).or_default())
    }

    /// Run `f` on the recent picks for `rule_id` while holding the
    /// conversation lock.
    pub async fn with_rule<T>(
        &self,
        id: ConversationId,
        rule_id: &str,
        f: impl FnOnce(&mut RecentPicks) -> T,
    ) -> T {
        let history = self.conversation(id).await;
        let mut history = history.lock().await;
        let picks = history.entry(rule_id.to_string()).or_default();
        f(picks)
    }

    /// Snapshot of the recent picks for a rule, oldest first.
    pub async fn recent(&self, id: ConversationId, rule_id: &str) -> Vec<usize> {
        let history = {
            let conversations = self.conversations.read().await;
            match conversations.get(&id) {
                Some(history) => Arc::clone(history),
                None => return Vec::new(),
            }
        };
        let history = history.lock().await;
        history.get(rule_id).map(RecentPicks::to_vec).unwrap_or_default()
    }

    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}
