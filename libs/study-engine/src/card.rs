//! Normalization of source items into study cards.

use crate::error::SchemaError;
use crate::types::{Card, CardKind, RawItem, Schedule};
use std::collections::HashSet;
use tracing::warn;

/// Outcome of normalizing a whole item list.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub cards: Vec<Card>,
    pub rejected: Vec<SchemaError>,
}

impl Normalized {
    /// Number of items dropped during normalization.
    pub fn dropped(&self) -> usize {
        self.rejected.len()
    }
}

/// Normalize a single item at the given position in the source list.
pub fn normalize(position: usize, item: &RawItem) -> Result<Card, SchemaError> {
    let kind = CardKind::from_discriminator(&item.kind).ok_or_else(|| SchemaError::UnknownKind {
        position,
        value: item.kind.clone(),
    })?;

    let id = item
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}-{}", kind.as_str(), position));

    let example_sentences = item
        .examples
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let category = item
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let card = match kind {
        CardKind::Vocabulary => {
            let term = field(&item.term);
            let reading = field(&item.phonetic);
            let script = field(&item.script);
            Card {
                id,
                kind,
                front: term.clone(),
                back: compose_back(&reading, &script),
                canonical_answer: term,
                reading,
                example_sentences,
                category,
                schedule: Schedule::default(),
            }
        }
        CardKind::Grammar => {
            let title = field(&item.title);
            Card {
                id,
                kind,
                front: title.clone(),
                back: field(&item.description),
                canonical_answer: title,
                reading: String::new(),
                example_sentences,
                category,
                schedule: Schedule::default(),
            }
        }
    };

    Ok(card)
}

/// Normalize a list of items, dropping and collecting those that fail.
pub fn normalize_all(items: &[RawItem]) -> Normalized {
    let mut normalized = Normalized::default();
    let mut seen_ids = HashSet::new();

    for (position, item) in items.iter().enumerate() {
        let result = normalize(position, item).and_then(|card| {
            if seen_ids.insert(card.id.clone()) {
                Ok(card)
            } else {
                Err(SchemaError::DuplicateId {
                    position,
                    id: card.id,
                })
            }
        });

        match result {
            Ok(card) => normalized.cards.push(card),
            Err(err) => {
                warn!(%err, "dropping study item");
                normalized.rejected.push(err);
            }
        }
    }

    normalized
}

fn field(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Phonetic reading followed by the literal script in parentheses.
fn compose_back(reading: &str, script: &str) -> String {
    match (reading.is_empty(), script.is_empty()) {
        (false, false) if reading != script => format!("{reading} ({script})"),
        (false, _) => reading.to_string(),
        (true, false) => script.to_string(),
        (true, true) => String::new(),
    }
}
