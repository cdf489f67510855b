use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::memory::{ConversationMemory, RecentPicks};
use crate::resolver::Resolution;
use crate::types::{ConversationId, DispatchOutcome, ReplyCandidate};

/// Replaced with the user's raw message text in reply-trigger candidates.
pub const USER_INPUT_PLACEHOLDER: &str = "{user_input}";

/// Picks a candidate for a resolved rule and renders it.
pub struct ReplySelector<'m> {
    memory: &'m ConversationMemory,
}

impl<'m> ReplySelector<'m> {
    pub fn new(memory: &'m ConversationMemory) -> Self {
        Self { memory }
    }

    /// Choose one candidate and turn it into a dispatchable outcome.
    ///
    /// Keyword rules avoid recently used candidates for this conversation;
    /// reply paths choose uniformly from the full list. The memory update
    /// is committed here, before anything is delivered.
    pub async fn select<R: Rng + Send>(
        &self,
        conversation: ConversationId,
        resolution: &Resolution<'_>,
        rng: &mut R,
    ) -> Option<DispatchOutcome> {
        let candidates = resolution.candidates();
        let index = match resolution.memory_key() {
            Some(rule_id) => {
                self.memory
                    .with_rule(conversation, rule_id, |recent| {
                        pick_fresh(rule_id, recent, candidates.len(), rng)
                    })
                    .await
            }
            None => pick_any(candidates.len(), rng),
        }?;

        render(&candidates[index], resolution.substitution.as_deref())
    }
}

/// Pick uniformly among candidates not in `recent`, then record the pick.
///
/// `recent` keeps at most `len - 1` entries, so at least one candidate is
/// always fresh. If none is (a history longer than the list), the history
/// is reset and every candidate becomes eligible again.
pub fn pick_fresh<R: Rng + ?Sized>(
    rule_id: &str,
    recent: &mut RecentPicks,
    len: usize,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let mut fresh: Vec<usize> = (0..len).filter(|i| !recent.contains(*i)).collect();
    if fresh.is_empty() {
        info!(rule = %rule_id, "every candidate used recently, resetting history");
        recent.clear();
        fresh = (0..len).collect();
    }

    let index = *fresh.choose(rng)?;
    recent.record(index, len - 1);
    Some(index)
}

/// Uniform pick with no history.
pub fn pick_any<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    (len > 0).then(|| rng.gen_range(0..len))
}

/// Replace every placeholder occurrence with `value`. Without a value the
/// text is returned as written.
pub fn substitute(text: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => text.replace(USER_INPUT_PLACEHOLDER, v),
        None => text.to_string(),
    }
}

/// Build the outcome for a candidate. Media wins over text, and the text
/// then travels as the caption.
pub fn render(candidate: &ReplyCandidate, substitution: Option<&str>) -> Option<DispatchOutcome> {
    let text = candidate.text.as_deref().map(|t| substitute(t, substitution));

    if let Some((kind, reference)) = candidate.media() {
        return Some(DispatchOutcome {
            kind,
            payload: reference.to_string(),
            caption: text,
        });
    }

    text.map(DispatchOutcome::text)
}
