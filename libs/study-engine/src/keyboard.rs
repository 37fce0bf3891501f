//! Key-to-action dispatch.
//!
//! Every key event is resolved against a fresh [`DispatchContext`] snapshot of
//! the session, so the mapping always reflects the current mode, face and
//! transition state.

use crate::transition::Face;
use crate::types::{Difficulty, StudyMode};
use serde::{Deserialize, Serialize};

/// Physical key relevant to a study session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Space,
    Enter,
    ArrowLeft,
    ArrowRight,
    Backspace,
    /// Top-row or keypad digit 0-9.
    Digit(u8),
    Char(char),
}

impl Key {
    /// Parse a DOM-style key code such as `Space`, `ArrowLeft`, `Digit3`
    /// or `KeyA`, or a single printable character.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" | " " => return Some(Self::Space),
            "Enter" | "NumpadEnter" => return Some(Self::Enter),
            "ArrowLeft" => return Some(Self::ArrowLeft),
            "ArrowRight" => return Some(Self::ArrowRight),
            "Backspace" => return Some(Self::Backspace),
            _ => {}
        }

        let digit = code
            .strip_prefix("Digit")
            .or_else(|| code.strip_prefix("Numpad"))
            .unwrap_or(code);
        if let Ok(value) = digit.parse::<u8>() {
            if value <= 9 {
                return Some(Self::Digit(value));
            }
        }

        let letter = code.strip_prefix("Key").unwrap_or(code);
        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => {
                if code.starts_with("Key") {
                    Some(Self::Char(c.to_ascii_lowercase()))
                } else {
                    Some(Self::Char(c))
                }
            }
            _ => None,
        }
    }

    /// Character this key contributes to typed input.
    fn as_text(self) -> Option<char> {
        match self {
            Self::Space => Some(' '),
            Self::Digit(d) => char::from_digit(u32::from(d), 10),
            Self::Char(c) => Some(c),
            _ => None,
        }
    }
}

/// Session operation a key resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Flip,
    Next,
    Previous,
    Rate(Difficulty),
    /// Zero-based option index.
    Select(usize),
    Type(char),
    Erase,
    SubmitTyped,
}

/// State of the current card's answer affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPhase {
    /// Nothing to answer (plain cards, or options not rendered yet).
    None,
    /// Options rendered and awaiting a selection.
    Choosing { options: usize },
    /// Typed response accepting input. Space flips while the buffer is empty.
    Typing { empty: bool },
    /// Result shown; only navigation remains.
    Locked,
}

/// Snapshot of everything the mapping depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchContext {
    pub mode: StudyMode,
    pub face: Face,
    pub transitioning: bool,
    pub answer: AnswerPhase,
}

/// Resolve a key against the current context.
pub fn resolve(ctx: &DispatchContext, key: Key) -> Option<Action> {
    if ctx.transitioning {
        return None;
    }

    if let AnswerPhase::Typing { empty } = ctx.answer {
        return match key {
            Key::Space if empty => Some(Action::Flip),
            Key::Enter => Some(Action::SubmitTyped),
            Key::Backspace => Some(Action::Erase),
            Key::ArrowLeft => Some(Action::Previous),
            Key::ArrowRight => Some(Action::Next),
            other => other.as_text().map(Action::Type),
        };
    }

    match key {
        Key::Space => Some(Action::Flip),
        Key::Enter | Key::ArrowRight => Some(Action::Next),
        Key::ArrowLeft => Some(Action::Previous),
        Key::Digit(d) => resolve_digit(ctx, d),
        Key::Backspace | Key::Char(_) => None,
    }
}

fn resolve_digit(ctx: &DispatchContext, digit: u8) -> Option<Action> {
    if let AnswerPhase::Choosing { options } = ctx.answer {
        let index = usize::from(digit).checked_sub(1)?;
        return (index < options).then_some(Action::Select(index));
    }
    if ctx.mode == StudyMode::Interval && ctx.face == Face::Back {
        return Difficulty::from_value(digit).map(Action::Rate);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(mode: StudyMode, face: Face, answer: AnswerPhase) -> DispatchContext {
        DispatchContext {
            mode,
            face,
            transitioning: false,
            answer,
        }
    }

    #[test]
    fn parses_dom_codes() {
        assert_eq!(Key::from_code("Space"), Some(Key::Space));
        assert_eq!(Key::from_code("Digit3"), Some(Key::Digit(3)));
        assert_eq!(Key::from_code("Numpad2"), Some(Key::Digit(2)));
        assert_eq!(Key::from_code("4"), Some(Key::Digit(4)));
        assert_eq!(Key::from_code("KeyK"), Some(Key::Char('k')));
        assert_eq!(Key::from_code("ん"), Some(Key::Char('ん')));
        assert_eq!(Key::from_code("Shift"), None);
    }

    #[test]
    fn navigation_and_flip_in_every_mode() {
        for mode in [StudyMode::Plain, StudyMode::Quiz, StudyMode::Interval] {
            let c = ctx(mode, Face::Front, AnswerPhase::None);
            assert_eq!(resolve(&c, Key::Space), Some(Action::Flip));
            assert_eq!(resolve(&c, Key::ArrowRight), Some(Action::Next));
            assert_eq!(resolve(&c, Key::Enter), Some(Action::Next));
            assert_eq!(resolve(&c, Key::ArrowLeft), Some(Action::Previous));
        }
    }

    #[test]
    fn rating_digits_need_interval_mode_and_back_face() {
        let back = ctx(StudyMode::Interval, Face::Back, AnswerPhase::None);
        assert_eq!(resolve(&back, Key::Digit(1)), Some(Action::Rate(Difficulty::Again)));
        assert_eq!(resolve(&back, Key::Digit(4)), Some(Action::Rate(Difficulty::Easy)));
        assert_eq!(resolve(&back, Key::Digit(5)), None);

        let front = ctx(StudyMode::Interval, Face::Front, AnswerPhase::None);
        assert_eq!(resolve(&front, Key::Digit(3)), None);

        let plain = ctx(StudyMode::Plain, Face::Back, AnswerPhase::None);
        assert_eq!(resolve(&plain, Key::Digit(3)), None);
    }

    #[test]
    fn option_digits_only_while_choosing() {
        let choosing = ctx(StudyMode::Quiz, Face::Front, AnswerPhase::Choosing { options: 3 });
        assert_eq!(resolve(&choosing, Key::Digit(1)), Some(Action::Select(0)));
        assert_eq!(resolve(&choosing, Key::Digit(3)), Some(Action::Select(2)));
        assert_eq!(resolve(&choosing, Key::Digit(4)), None);
        assert_eq!(resolve(&choosing, Key::Digit(0)), None);

        let not_rendered = ctx(StudyMode::Quiz, Face::Front, AnswerPhase::None);
        assert_eq!(resolve(&not_rendered, Key::Digit(1)), None);

        let locked = ctx(StudyMode::Quiz, Face::Front, AnswerPhase::Locked);
        assert_eq!(resolve(&locked, Key::Digit(1)), None);
        assert_eq!(resolve(&locked, Key::Enter), Some(Action::Next));
    }

    #[test]
    fn typing_routes_printable_keys_to_input() {
        let typing = ctx(StudyMode::Quiz, Face::Front, AnswerPhase::Typing { empty: false });
        assert_eq!(resolve(&typing, Key::Char('k')), Some(Action::Type('k')));
        assert_eq!(resolve(&typing, Key::Space), Some(Action::Type(' ')));
        assert_eq!(resolve(&typing, Key::Digit(2)), Some(Action::Type('2')));
        assert_eq!(resolve(&typing, Key::Backspace), Some(Action::Erase));
        assert_eq!(resolve(&typing, Key::Enter), Some(Action::SubmitTyped));
    }

    #[test]
    fn space_flips_until_something_is_typed() {
        let empty = ctx(StudyMode::Quiz, Face::Front, AnswerPhase::Typing { empty: true });
        assert_eq!(resolve(&empty, Key::Space), Some(Action::Flip));
        assert_eq!(resolve(&empty, Key::Char('i')), Some(Action::Type('i')));
        assert_eq!(resolve(&empty, Key::Enter), Some(Action::SubmitTyped));
    }

    #[test]
    fn everything_ignored_while_transitioning() {
        let mut c = ctx(StudyMode::Interval, Face::Back, AnswerPhase::Choosing { options: 4 });
        c.transitioning = true;
        for key in [Key::Space, Key::Enter, Key::ArrowLeft, Key::Digit(1), Key::Char('a')] {
            assert_eq!(resolve(&c, key), None);
        }
    }
}
