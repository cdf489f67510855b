use serde::Deserialize;
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_json::Value;
use std::fmt;
use tracing::warn;

use crate::types::ReplyCandidate;

/// On-disk catalog document, before any validation.
///
/// Only a JSON object is accepted at the top level. Absent sections are
/// empty and unknown sections are ignored.
#[derive(Debug, Default)]
pub struct RawCatalog {
    pub keyword_replies: OrderedEntries,
    pub reply_replies: OrderedEntries,
    pub generic_replies: Value,
}

impl<'de> Deserialize<'de> for RawCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = RawCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a catalog object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut raw = RawCatalog::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "respostas_por_palavra_chave" => raw.keyword_replies = map.next_value()?,
                        "respostas_por_reply" => raw.reply_replies = map.next_value()?,
                        "resposta_generica_para_reply" => raw.generic_replies = map.next_value()?,
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(raw)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// JSON object entries in document order.
///
/// `serde_json::Map` sorts its keys, and rule precedence follows the order
/// the author wrote them in, so the object is walked by hand.
#[derive(Debug, Default)]
pub struct OrderedEntries(pub Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping keys to replies")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedEntries::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_any(EntriesVisitor)
    }
}

/// Candidate object as written in the catalog.
#[derive(Debug, Default, Deserialize)]
struct RawCandidate {
    texto: Option<String>,
    sticker: Option<String>,
    gif: Option<String>,
    foto: Option<String>,
    audio: Option<String>,
    voz: Option<String>,
}

impl From<RawCandidate> for ReplyCandidate {
    fn from(raw: RawCandidate) -> Self {
        Self {
            text: raw.texto,
            sticker: raw.sticker,
            animation: raw.gif,
            photo: raw.foto,
            audio: raw.audio,
            voice: raw.voz,
        }
    }
}

/// Turn a reply value into candidates, dropping entries that carry no
/// content or have the wrong type.
///
/// Accepts an array of candidates, a single candidate object, or a bare
/// string (shorthand for a text candidate), at either level.
pub fn parse_candidates(label: &str, value: Value) -> Vec<ReplyCandidate> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| parse_candidate(label, i, item))
            .collect(),
        Value::Null => Vec::new(),
        single => parse_candidate(label, 0, single).into_iter().collect(),
    }
}

fn parse_candidate(label: &str, index: usize, value: Value) -> Option<ReplyCandidate> {
    let candidate = match value {
        Value::String(text) => ReplyCandidate::text(text),
        Value::Object(_) => match serde_json::from_value::<RawCandidate>(value) {
            Ok(raw) => raw.into(),
            Err(e) => {
                warn!(entry = %label, index, "skipping malformed candidate: {e}");
                return None;
            }
        },
        other => {
            warn!(entry = %label, index, "skipping candidate of unexpected type: {other}");
            return None;
        }
    };

    if !candidate.has_content() {
        warn!(entry = %label, index, "skipping candidate without content");
        return None;
    }
    Some(candidate)
}
