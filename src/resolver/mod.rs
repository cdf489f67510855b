use tracing::debug;

use crate::catalog::{Catalog, ReplyTriggerRule, Rule};
use crate::error::MalformedEventError;
use crate::types::{InboundEvent, ReplyCandidate};

/// Which table produced a match.
#[derive(Debug, Clone, Copy)]
pub enum MatchedRule<'a> {
    Keyword(&'a Rule),
    ReplyTrigger(&'a ReplyTriggerRule),
    GenericReply(&'a [ReplyCandidate]),
}

/// Outcome of resolving one inbound message.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub rule: MatchedRule<'a>,
    /// Value for the `{user_input}` placeholder, when the rule uses one.
    pub substitution: Option<String>,
    pub matched_by: &'static str,
}

impl<'a> Resolution<'a> {
    pub fn candidates(&self) -> &'a [ReplyCandidate] {
        match self.rule {
            MatchedRule::Keyword(rule) => &rule.candidates,
            MatchedRule::ReplyTrigger(rule) => &rule.candidates,
            MatchedRule::GenericReply(candidates) => candidates,
        }
    }

    /// Identity under which repetition memory is tracked. Only keyword
    /// rules are remembered; reply paths pick freely every time.
    pub fn memory_key(&self) -> Option<&'a str> {
        match self.rule {
            MatchedRule::Keyword(rule) => Some(rule.keys.id()),
            MatchedRule::ReplyTrigger(_) | MatchedRule::GenericReply(_) => None,
        }
    }
}

/// Decides which rule, if any, answers a message.
///
/// Order: reply-to-bot (trigger rules, then generic replies) and otherwise
/// keyword rules. A reply to the bot never falls through to keywords.
pub struct MatchResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> MatchResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// `Ok(None)` is the normal "no reply" outcome.
    pub fn resolve(
        &self,
        event: &InboundEvent,
        bot_id: Option<i64>,
    ) -> Result<Option<Resolution<'a>>, MalformedEventError> {
        let text = match event.text.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(MalformedEventError::MissingText),
        };

        if let Some(bot_text) = replied_bot_text(event, bot_id) {
            return Ok(self.resolve_reply(text, &bot_text.to_lowercase()));
        }

        Ok(self.resolve_keyword(&text.to_lowercase()))
    }

    fn resolve_reply(&self, user_text: &str, folded_bot_text: &str) -> Option<Resolution<'a>> {
        if let Some(rule) = self
            .catalog
            .reply_triggers()
            .iter()
            .find(|r| r.matches(folded_bot_text))
        {
            return Some(Resolution {
                rule: MatchedRule::ReplyTrigger(rule),
                substitution: Some(user_text.to_string()),
                matched_by: "reply.trigger",
            });
        }

        let generic = self.catalog.generic_replies();
        if generic.is_empty() {
            debug!("reply to bot matched no trigger and no generic replies are configured");
            return None;
        }
        Some(Resolution {
            rule: MatchedRule::GenericReply(generic),
            substitution: None,
            matched_by: "reply.generic",
        })
    }

    fn resolve_keyword(&self, folded_text: &str) -> Option<Resolution<'a>> {
        self.catalog
            .lookup_all()
            .iter()
            .find(|rule| rule.keys.matches(folded_text))
            .map(|rule| Resolution {
                rule: MatchedRule::Keyword(rule),
                substitution: None,
                matched_by: "keyword",
            })
    }
}

/// Text of the bot's own message this event replies to, if it is one.
///
/// A replied-to message without text still counts as a reply to the bot;
/// triggers then see an empty string.
fn replied_bot_text(event: &InboundEvent, bot_id: Option<i64>) -> Option<&str> {
    let bot_id = bot_id?;
    let replied = event.replied_to.as_ref()?;
    if replied.sender_id != Some(bot_id) {
        return None;
    }
    Some(replied.text.as_deref().unwrap_or(""))
}
