//! Study session engine shared by the drill front ends.
//!
//! Provides:
//! - Normalization of vocabulary/grammar items into study cards
//! - The interval rule used by Interval-mode reviews
//! - Multiple-choice and typed-response grading
//! - A timed slide/flip state machine and the session controller on top
//! - Key dispatch and a tokio driver for the session's timers

pub mod card;
pub mod error;
pub mod evaluator;
pub mod keyboard;
pub mod matching;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod transition;
pub mod transliteration;
pub mod types;

pub use card::{normalize, normalize_all, Normalized};
pub use error::{EmptySessionError, InsufficientOptions, Result, SchemaError, StudyError};
pub use evaluator::{build_choices, grade_choice, grade_typed, ChoiceSet, TypedInput};
pub use keyboard::{resolve, Action, AnswerPhase, DispatchContext, Key};
pub use matching::{compare_answers, MatchResult};
pub use runtime::{spawn, spawn_with_rng, SessionCommand, SessionHandle};
pub use scheduler::{rate, IntervalRule};
pub use session::{Grade, GradeSource, ReviewedCard, Session, SessionEvent, SessionReport};
pub use transition::{Direction, Face, Motion, TransitionController, TransitionState};
pub use transliteration::Transliterator;
pub use types::{
    Card, CardKind, Confidence, Difficulty, EngineSettings, MatchingMode, QuizFormat, QuizMark,
    RawItem, Schedule, SessionStats, StudyMode,
};
