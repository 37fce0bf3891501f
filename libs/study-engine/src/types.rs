//! Core types for study sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of source item a card was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Vocabulary,
    Grammar,
}

impl CardKind {
    /// Parse the item discriminator (case-insensitive).
    pub fn from_discriminator(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vocabulary" | "vocab" => Some(Self::Vocabulary),
            "grammar" => Some(Self::Grammar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocabulary => "vocabulary",
            Self::Grammar => "grammar",
        }
    }
}

/// Difficulty rating given in Interval mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Again,
    Hard,
    Good,
    Easy,
}

impl Difficulty {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Self-assessment mark recorded in Quiz mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMark {
    Known,
    Unknown,
    Skipped,
}

impl QuizMark {
    /// Mark for a graded answer.
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Known
        } else {
            Self::Unknown
        }
    }
}

/// Confidence annotation stored per card index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "tag", rename_all = "snake_case")]
pub enum Confidence {
    Quiz(QuizMark),
    Interval(Difficulty),
}

/// Spaced repetition state of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Days until the next review, never below 1.
    pub interval: f64,
    /// Carried for compatibility, not updated by the interval rule.
    pub ease_factor: f64,
    pub repetitions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            interval: 1.0,
            ease_factor: 2.5,
            repetitions: 0,
            last_reviewed: None,
        }
    }
}

/// Source item as delivered by the item source.
///
/// Every field is optional on the wire; missing strings become empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub term: Option<String>,
    pub phonetic: Option<String>,
    pub script: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub examples: Vec<String>,
    #[serde(alias = "topic")]
    pub category: Option<String>,
}

impl RawItem {
    /// Vocabulary item with the given term, reading and script.
    pub fn vocabulary(term: &str, phonetic: &str, script: &str) -> Self {
        Self {
            kind: "vocabulary".to_string(),
            term: Some(term.to_string()),
            phonetic: Some(phonetic.to_string()),
            script: Some(script.to_string()),
            ..Default::default()
        }
    }

    /// Grammar item with the given title and description.
    pub fn grammar(title: &str, description: &str) -> Self {
        Self {
            kind: "grammar".to_string(),
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }
}

/// Normalized study card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub kind: CardKind,
    pub front: String,
    pub back: String,
    pub canonical_answer: String,
    /// Phonetic reading, empty for grammar cards.
    pub reading: String,
    pub example_sentences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub schedule: Schedule,
}

impl Card {
    /// Whether typed answers for this card are written in phonetic script.
    pub fn expects_phonetic(&self) -> bool {
        self.kind == CardKind::Vocabulary && !self.reading.trim().is_empty()
    }

    /// Expected answer for the typed-response drill.
    pub fn typed_answer(&self) -> &str {
        if self.expects_phonetic() {
            &self.reading
        } else {
            &self.canonical_answer
        }
    }
}

/// Study mode, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    Plain,
    Quiz,
    Interval,
}

impl Default for StudyMode {
    fn default() -> Self {
        Self::Plain
    }
}

impl StudyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Quiz => "quiz",
            Self::Interval => "interval",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "plain" => Some(Self::Plain),
            "quiz" => Some(Self::Quiz),
            "interval" => Some(Self::Interval),
            _ => None,
        }
    }
}

/// How vocabulary cards are graded in Quiz mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizFormat {
    MultipleChoice,
    TypedResponse,
}

impl Default for QuizFormat {
    fn default() -> Self {
        Self::MultipleChoice
    }
}

impl QuizFormat {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" | "choice" => Some(Self::MultipleChoice),
            "typed_response" | "typed" => Some(Self::TypedResponse),
            _ => None,
        }
    }
}

/// Matching mode for typed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    Exact,
    CaseInsensitive,
    Fuzzy,
}

impl Default for MatchingMode {
    fn default() -> Self {
        Self::Exact
    }
}

impl MatchingMode {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(Self::Exact),
            "case_insensitive" => Some(Self::CaseInsensitive),
            "fuzzy" => Some(Self::Fuzzy),
            _ => None,
        }
    }
}

/// Aggregate counters for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl SessionStats {
    fn counter(&mut self, confidence: Confidence) -> &mut u32 {
        match confidence {
            Confidence::Quiz(QuizMark::Known) => &mut self.correct,
            Confidence::Quiz(QuizMark::Unknown) => &mut self.incorrect,
            Confidence::Quiz(QuizMark::Skipped) => &mut self.skipped,
            Confidence::Interval(Difficulty::Again) => &mut self.again,
            Confidence::Interval(Difficulty::Hard) => &mut self.hard,
            Confidence::Interval(Difficulty::Good) => &mut self.good,
            Confidence::Interval(Difficulty::Easy) => &mut self.easy,
        }
    }

    /// Count one occurrence of a confidence tag.
    pub fn record(&mut self, confidence: Confidence) {
        *self.counter(confidence) += 1;
    }

    /// Undo a previous [`record`](Self::record) of the same tag.
    pub fn retract(&mut self, confidence: Confidence) {
        let counter = self.counter(confidence);
        *counter = counter.saturating_sub(1);
    }

    /// Total number of graded cards.
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect + self.skipped + self.again + self.hard + self.good + self.easy
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Length of each slide phase of a card transition.
    pub phase_delay_ms: u64,
    /// Delay between a grade and the automatic advance.
    pub advance_delay_ms: u64,
    /// Options presented on a multiple-choice card.
    pub option_count: usize,
    pub quiz_format: QuizFormat,
    pub matching_mode: MatchingMode,
    pub fuzzy_threshold: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            phase_delay_ms: 300,
            advance_delay_ms: 500,
            option_count: 4,
            quiz_format: QuizFormat::default(),
            matching_mode: MatchingMode::default(),
            fuzzy_threshold: 0.8,
        }
    }
}

impl EngineSettings {
    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}
