//! Grading of multiple-choice selections and typed responses.

use crate::error::InsufficientOptions;
use crate::matching::{compare_answers, MatchResult};
use crate::transliteration::Transliterator;
use crate::types::{Card, MatchingMode};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Whether a selected option matches the canonical answer.
pub fn grade_choice(selected: &str, canonical_answer: &str) -> bool {
    selected.trim() == canonical_answer.trim()
}

/// Options presented for one multiple-choice card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceSet {
    pub options: Vec<String>,
    /// Index of the chosen option once the result is locked in.
    pub selected: Option<usize>,
    pub correct: Option<bool>,
}

impl ChoiceSet {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            selected: None,
            correct: None,
        }
    }

    /// True once a selection has been graded.
    pub fn is_locked(&self) -> bool {
        self.selected.is_some()
    }

    /// Grade the option at `index` and lock the result.
    ///
    /// Returns `None` if the set is already locked or the index is out of range.
    pub fn select(&mut self, index: usize, canonical_answer: &str) -> Option<bool> {
        if self.is_locked() {
            return None;
        }
        let option = self.options.get(index)?;
        let correct = grade_choice(option, canonical_answer);
        self.selected = Some(index);
        self.correct = Some(correct);
        Some(correct)
    }
}

/// Build shuffled options for `cards[index]`.
///
/// Distractors are the distinct canonical answers of the other cards. Fails
/// with [`InsufficientOptions`] when fewer than `count` distinct options exist.
pub fn build_choices<R: Rng + ?Sized>(
    cards: &[Card],
    index: usize,
    count: usize,
    rng: &mut R,
) -> Result<ChoiceSet, InsufficientOptions> {
    let required = count.max(2);
    let Some(card) = cards.get(index) else {
        return Err(InsufficientOptions {
            available: 0,
            required,
        });
    };
    let answer = card.canonical_answer.trim();

    let mut distractors: Vec<&str> = Vec::new();
    for (i, other) in cards.iter().enumerate() {
        let candidate = other.canonical_answer.trim();
        if i == index || candidate.is_empty() || candidate == answer {
            continue;
        }
        if !distractors.contains(&candidate) {
            distractors.push(candidate);
        }
    }

    let available = distractors.len() + usize::from(!answer.is_empty());
    if answer.is_empty() || available < required {
        return Err(InsufficientOptions {
            available,
            required,
        });
    }

    distractors.shuffle(rng);
    let mut options: Vec<String> = distractors
        .into_iter()
        .take(required - 1)
        .map(str::to_string)
        .collect();
    options.push(answer.to_string());
    options.shuffle(rng);

    Ok(ChoiceSet::new(options))
}

/// Text typed for a typed-response card.
///
/// Keeps the raw romanized keystrokes and the composed text produced by the
/// transliteration adapter from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypedInput {
    raw: String,
    composed: String,
}

impl TypedInput {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Text as shown to the user and graded.
    pub fn composed(&self) -> &str {
        &self.composed
    }

    pub fn is_blank(&self) -> bool {
        self.composed.trim().is_empty()
    }

    pub fn push_str(&mut self, chunk: &str, adapter: Option<&dyn Transliterator>) {
        self.raw.push_str(chunk);
        self.recompose(adapter);
    }

    pub fn backspace(&mut self, adapter: Option<&dyn Transliterator>) -> bool {
        if self.raw.pop().is_none() {
            return false;
        }
        self.recompose(adapter);
        true
    }

    fn recompose(&mut self, adapter: Option<&dyn Transliterator>) {
        self.composed = match adapter {
            Some(adapter) => adapter.transliterate(&self.raw),
            None => self.raw.clone(),
        };
    }
}

/// Grade a typed response against the card's expected answer.
///
/// Returns `None` for blank input, which must not be submitted.
pub fn grade_typed(
    input: &TypedInput,
    card: &Card,
    mode: MatchingMode,
    fuzzy_threshold: f64,
) -> Option<MatchResult> {
    if input.is_blank() {
        return None;
    }
    Some(compare_answers(
        input.composed(),
        card.typed_answer(),
        mode,
        fuzzy_threshold,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::normalize_all;
    use crate::types::RawItem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cards(terms: &[&str]) -> Vec<Card> {
        let items: Vec<RawItem> = terms
            .iter()
            .map(|t| RawItem::vocabulary(t, "", ""))
            .collect();
        normalize_all(&items).cards
    }

    #[test]
    fn grade_choice_ignores_outer_whitespace() {
        assert!(grade_choice(" dog ", "dog"));
        assert!(grade_choice("dog", "\tdog\n"));
        assert!(!grade_choice("cat", "dog"));
        assert!(!grade_choice("Dog", "dog"));
    }

    #[test]
    fn choices_contain_answer_once() {
        let cards = cards(&["dog", "cat", "bird", "fish", "cow"]);
        let mut rng = StdRng::seed_from_u64(7);
        let choices = build_choices(&cards, 2, 4, &mut rng).unwrap();
        assert_eq!(choices.options.len(), 4);
        assert_eq!(choices.options.iter().filter(|o| *o == "bird").count(), 1);
        let mut unique = choices.options.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn duplicate_answers_do_not_count_as_distractors() {
        let cards = cards(&["dog", "dog ", "cat", "cat"]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_choices(&cards, 0, 4, &mut rng).unwrap_err();
        assert_eq!(
            err,
            InsufficientOptions {
                available: 2,
                required: 4
            }
        );
    }

    #[test]
    fn select_locks_result() {
        let mut choices = ChoiceSet::new(vec!["cat".into(), "dog".into()]);
        assert_eq!(choices.select(5, "dog"), None);
        assert_eq!(choices.select(0, "dog"), Some(false));
        assert!(choices.is_locked());
        assert_eq!(choices.select(1, "dog"), None);
        assert_eq!(choices.correct, Some(false));
    }

    #[test]
    fn typed_input_recomposes_through_adapter() {
        let upper = |s: &str| s.to_uppercase();
        let mut input = TypedInput::default();
        input.push_str("ka", Some(&upper));
        assert_eq!(input.raw(), "ka");
        assert_eq!(input.composed(), "KA");
        assert!(input.backspace(Some(&upper)));
        assert_eq!(input.composed(), "K");
        assert!(input.backspace(Some(&upper)));
        assert_eq!(input.composed(), "");
        assert!(!input.backspace(None));
    }

    #[test]
    fn blank_typed_input_is_not_graded() {
        let card = &cards(&["dog"])[0];
        let mut input = TypedInput::default();
        input.push_str("   ", None);
        assert!(grade_typed(&input, card, MatchingMode::Exact, 0.8).is_none());
        input.push_str("dog ", None);
        let result = grade_typed(&input, card, MatchingMode::Exact, 0.8).unwrap();
        assert!(result.is_correct);
    }
}
