pub mod raw;

use serde_json::error::Category;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::ConfigError;
use crate::types::ReplyCandidate;
use raw::{RawCatalog, parse_candidates};

/// Separator between synonyms inside one catalog key.
pub const KEY_DELIMITER: char = ',';

/// Case-folded synonyms that trigger one rule.
///
/// The raw key as written in the catalog is kept as the rule's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleKeySet {
    id: String,
    keys: Vec<String>,
}

impl RuleKeySet {
    /// Split a catalog key on [`KEY_DELIMITER`]. Returns `None` when no
    /// non-empty member remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut keys: Vec<String> = Vec::new();
        for key in raw
            .split(KEY_DELIMITER)
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return None;
        }
        Some(Self {
            id: raw.trim().to_string(),
            keys,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Substring containment against already case-folded text.
    pub fn matches(&self, folded_text: &str) -> bool {
        self.keys.iter().any(|k| folded_text.contains(k.as_str()))
    }
}

/// Keyword rule: any key contained in the user's text selects `candidates`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub keys: RuleKeySet,
    pub candidates: Vec<ReplyCandidate>,
}

/// Rule matched against the text of the bot's own message being replied to.
#[derive(Debug, Clone)]
pub struct ReplyTriggerRule {
    trigger: String,
    pub candidates: Vec<ReplyCandidate>,
}

impl ReplyTriggerRule {
    pub fn new(trigger: &str, candidates: Vec<ReplyCandidate>) -> Option<Self> {
        let trigger = trigger.trim().to_lowercase();
        if trigger.is_empty() || candidates.is_empty() {
            return None;
        }
        Some(Self {
            trigger,
            candidates,
        })
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn matches(&self, folded_text: &str) -> bool {
        folded_text.contains(self.trigger.as_str())
    }
}

/// Immutable rule tables, loaded once and shared by every conversation.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rules: Vec<Rule>,
    reply_triggers: Vec<ReplyTriggerRule>,
    generic_replies: Vec<ReplyCandidate>,
}

impl Catalog {
    /// A catalog that never matches.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog document.
    ///
    /// Invalid JSON and a wrong overall structure are errors; individual
    /// keys, triggers and candidates that make no sense are skipped with a
    /// warning.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let raw: RawCatalog = serde_json::from_str(source).map_err(|e| match e.classify() {
            Category::Data => ConfigError::Shape(e.to_string()),
            _ => ConfigError::Parse(e),
        })?;

        let mut rules = Vec::with_capacity(raw.keyword_replies.0.len());
        for (key, value) in raw.keyword_replies.0 {
            let Some(keys) = RuleKeySet::parse(&key) else {
                warn!(key = %key, "skipping keyword rule with no usable keys");
                continue;
            };
            let candidates = parse_candidates(&key, value);
            if candidates.is_empty() {
                warn!(key = %key, "skipping keyword rule with no candidates");
                continue;
            }
            rules.push(Rule { keys, candidates });
        }

        let mut reply_triggers = Vec::with_capacity(raw.reply_replies.0.len());
        for (trigger, value) in raw.reply_replies.0 {
            let candidates = parse_candidates(&trigger, value);
            match ReplyTriggerRule::new(&trigger, candidates) {
                Some(rule) => reply_triggers.push(rule),
                None => warn!(trigger = %trigger, "skipping empty reply trigger"),
            }
        }

        let generic_replies = parse_candidates("resposta_generica_para_reply", raw.generic_replies);

        Ok(Self {
            rules,
            reply_triggers,
            generic_replies,
        })
    }

    /// Read and parse a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json(&content)
    }

    /// Load a catalog, falling back to an empty one when it cannot be read.
    ///
    /// The service keeps running on failure; it just never replies.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    rules = catalog.rules.len(),
                    reply_triggers = catalog.reply_triggers.len(),
                    generic_replies = catalog.generic_replies.len(),
                    "catalog loaded"
                );
                catalog
            }
            Err(e) => {
                error!(path = %path.display(), "catalog unavailable, replies disabled: {e}");
                Self::empty()
            }
        }
    }

    /// Keyword rules in declaration order. Earlier rules take precedence.
    pub fn lookup_all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn reply_triggers(&self) -> &[ReplyTriggerRule] {
        &self.reply_triggers
    }

    pub fn generic_replies(&self) -> &[ReplyCandidate] {
        &self.generic_replies
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.reply_triggers.is_empty() && self.generic_replies.is_empty()
    }
}
