//! Error types for study-engine.

use thiserror::Error;

/// Result type alias using StudyError.
pub type Result<T> = std::result::Result<T, StudyError>;

/// A source item that could not be turned into a card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown item type {value:?} at position {position}")]
    UnknownKind { position: usize, value: String },

    #[error("duplicate id {id} at position {position}")]
    DuplicateId { position: usize, id: String },
}

/// No usable card survived normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no usable cards in session ({dropped} items dropped)")]
pub struct EmptySessionError {
    pub dropped: usize,
}

/// A multiple-choice card without enough distinct options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("only {available} distinct options available, {required} required")]
pub struct InsufficientOptions {
    pub available: usize,
    pub required: usize,
}

/// Any error surfaced by the engine.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    EmptySession(#[from] EmptySessionError),

    #[error(transparent)]
    InsufficientOptions(#[from] InsufficientOptions),

    #[error("session has ended")]
    SessionClosed,
}
