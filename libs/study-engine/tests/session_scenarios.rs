//! End-to-end study session scenarios driven through the public API.

use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use study_engine::{
    Confidence, Difficulty, EngineSettings, Face, Key, Motion, QuizFormat, QuizMark, RawItem,
    Session, SessionEvent, StudyMode,
};

const PHASE: Duration = Duration::from_millis(300);
const CONFIRM: Duration = Duration::from_millis(500);

fn vocabulary(terms: &[&str]) -> Vec<RawItem> {
    terms
        .iter()
        .enumerate()
        .map(|(i, term)| {
            let mut item = RawItem::vocabulary(term, "", "");
            item.id = Some(format!("v{i}"));
            item
        })
        .collect()
}

#[test]
fn interval_rating_reschedules_and_auto_advances() {
    let t0 = Instant::now();
    let mut session = Session::start(
        &vocabulary(&["dog", "cat", "bird"]),
        StudyMode::Interval,
        EngineSettings::default(),
    )
    .unwrap();

    assert!(session.handle_key(Key::Space, t0));
    assert_eq!(session.face(), Face::Back);
    assert!(session.handle_key(Key::Digit(3), t0));

    let schedule = &session.cards()[0].schedule;
    assert_eq!(schedule.interval, 2.5);
    assert_eq!(schedule.repetitions, 1);
    assert!(schedule.last_reviewed.is_some());

    assert!(session.poll(t0 + CONFIRM - Duration::from_millis(1)).is_empty());
    assert_eq!(session.current_index(), 0);

    let t1 = t0 + CONFIRM;
    assert!(session.poll(t1).is_empty());
    assert_eq!(session.motion(), Motion::SlideOutLeft);

    assert_eq!(session.poll(t1 + PHASE), vec![SessionEvent::Advanced { index: 1 }]);
    assert_eq!(session.poll(t1 + 2 * PHASE), vec![SessionEvent::Settled { index: 1 }]);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.face(), Face::Front);
}

#[test]
fn quiz_digit_before_options_is_ignored_then_selects() {
    let t0 = Instant::now();
    let mut session =
        Session::start(&vocabulary(&["dog"]), StudyMode::Quiz, EngineSettings::default()).unwrap();

    assert!(!session.handle_key(Key::Digit(1), t0));
    assert_eq!(session.stats().total(), 0);

    let options = ["dog", "cat", "bird", "fish"].map(String::from).to_vec();
    assert_eq!(session.present_choices(options), Ok(true));

    assert!(session.handle_key(Key::Digit(2), t0));
    assert_eq!(session.stats().incorrect, 1);
    assert_eq!(session.confidence(0), Some(Confidence::Quiz(QuizMark::Unknown)));

    assert!(!session.handle_key(Key::Digit(1), t0));
    assert_eq!(session.stats().correct, 0);
}

#[test]
fn empty_item_list_refuses_to_start() {
    let err = Session::start(&[], StudyMode::Interval, EngineSettings::default())
        .err()
        .unwrap();
    assert_eq!(err.dropped, 0);
}

#[test]
fn rapid_next_presses_advance_once() {
    let t0 = Instant::now();
    let mut session = Session::start(
        &vocabulary(&["dog", "cat", "bird"]),
        StudyMode::Plain,
        EngineSettings::default(),
    )
    .unwrap();

    assert!(session.handle_key(Key::ArrowRight, t0));
    assert!(!session.handle_key(Key::ArrowRight, t0 + Duration::from_millis(10)));
    assert!(!session.handle_key(Key::Enter, t0 + PHASE + Duration::from_millis(10)));
    assert!(!session.handle_key(Key::Space, t0 + PHASE + Duration::from_millis(10)));

    session.poll(t0 + 2 * PHASE);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.face(), Face::Front);
}

#[test]
fn choice_grading_ignores_surrounding_whitespace() {
    let t0 = Instant::now();
    let mut session = Session::start(
        &vocabulary(&["  dog ", "cat"]),
        StudyMode::Quiz,
        EngineSettings::default(),
    )
    .unwrap();

    let options = [" cat", "dog\t", "bird", "fish"].map(String::from).to_vec();
    session.present_choices(options).unwrap();
    assert_eq!(session.select_choice(1, t0), Some(true));
    assert_eq!(session.stats().correct, 1);
}

#[test]
fn overruling_is_idempotent() {
    let t0 = Instant::now();
    let settings = EngineSettings {
        quiz_format: QuizFormat::TypedResponse,
        ..Default::default()
    };
    let mut session =
        Session::start(&vocabulary(&["dog", "cat"]), StudyMode::Quiz, settings).unwrap();

    for key in [Key::Char('d'), Key::Char('o'), Key::Char('g'), Key::Char('s')] {
        assert!(session.handle_key(key, t0));
    }
    assert!(session.handle_key(Key::Enter, t0));
    assert_eq!(session.stats().incorrect, 1);

    assert!(session.mark_correct());
    assert!(!session.mark_correct());
    assert_eq!(session.stats().correct, 1);
    assert_eq!(session.stats().incorrect, 0);
    assert_eq!(session.confidence(1), None);

    assert!(session.handle_key(Key::Enter, t0));
    session.poll(t0 + 2 * PHASE);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.typed_input().map(|i| i.raw()), Some(""));
}

#[test]
fn overruling_a_correct_answer_changes_nothing() {
    let t0 = Instant::now();
    let settings = EngineSettings {
        quiz_format: QuizFormat::TypedResponse,
        ..Default::default()
    };
    let mut session =
        Session::start(&vocabulary(&["dog", "cat"]), StudyMode::Quiz, settings).unwrap();

    for key in [Key::Char('d'), Key::Char('o'), Key::Char('g')] {
        assert!(session.handle_key(key, t0));
    }
    assert!(session.handle_key(Key::Enter, t0));
    assert_eq!(session.confidence(0), Some(Confidence::Quiz(QuizMark::Known)));

    assert!(!session.mark_correct());
    assert_eq!(session.stats().correct, 1);
    assert_eq!(session.stats().incorrect, 0);
    assert_eq!(session.confidence(0), Some(Confidence::Quiz(QuizMark::Known)));
}

#[test]
fn plain_mode_ignores_grading() {
    let t0 = Instant::now();
    let mut session =
        Session::start(&vocabulary(&["dog"]), StudyMode::Plain, EngineSettings::default()).unwrap();
    session.flip();
    assert!(!session.submit_difficulty(Difficulty::Good, t0));
    assert!(!session.submit_confidence(QuizMark::Known, t0));
    assert!(!session.handle_key(Key::Digit(3), t0));

    let report = session.exit();
    assert_eq!(report.stats.total(), 0);
    assert!(report.reviewed.is_empty());
}
