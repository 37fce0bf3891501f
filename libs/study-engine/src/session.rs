//! Study session controller.
//!
//! Owns the fixed card sequence, the current position, the grade ledger and
//! the aggregate statistics. All timed behavior is expressed as deadlines
//! that fire from [`Session::poll`]; nothing here sleeps.

use crate::card::normalize_all;
use crate::error::{EmptySessionError, InsufficientOptions};
use crate::evaluator::{build_choices, grade_typed, ChoiceSet, TypedInput};
use crate::keyboard::{resolve, Action, AnswerPhase, DispatchContext, Key};
use crate::matching::MatchResult;
use crate::scheduler::IntervalRule;
use crate::transition::{Direction, Face, Motion, TransitionController, TransitionEvent, TransitionState};
use crate::transliteration::Transliterator;
use crate::types::{
    Card, CardKind, Confidence, Difficulty, EngineSettings, QuizFormat, QuizMark, RawItem,
    Schedule, SessionStats, StudyMode,
};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Notification produced while polling a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The visible card changed (slide midpoint).
    Advanced { index: usize },
    /// The slide finished and input is accepted again.
    Settled { index: usize },
    /// The last card was passed.
    Completed { stats: SessionStats },
}

/// Where a grade came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GradeSource {
    SelfAssessed,
    Choice { option: String },
    Typed { answer: String },
}

/// Ledger entry for one graded card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub confidence: Confidence,
    pub source: GradeSource,
}

/// Updated schedule of a card rated during the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewedCard {
    pub id: String,
    pub schedule: Schedule,
}

/// Final snapshot handed to the caller on exit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub mode: StudyMode,
    pub stats: SessionStats,
    pub cards_seen: usize,
    pub total_cards: usize,
    pub completed: bool,
    pub dropped: usize,
    pub reviewed: Vec<ReviewedCard>,
}

/// Answer affordance of the current card.
#[derive(Debug, Clone)]
enum CardAnswer {
    None,
    Choices(ChoiceSet),
    ChoicesUnavailable(InsufficientOptions),
    Typing(TypedInput),
    TypedGraded { input: TypedInput, result: MatchResult },
}

#[derive(Debug, Clone, Copy)]
struct AutoAdvance {
    index: usize,
    deadline: Instant,
}

/// A live study run.
pub struct Session {
    id: Uuid,
    mode: StudyMode,
    settings: EngineSettings,
    rule: IntervalRule,
    cards: Vec<Card>,
    current_index: usize,
    transition: TransitionController,
    ledger: BTreeMap<usize, Grade>,
    stats: SessionStats,
    seen: BTreeSet<usize>,
    answer: CardAnswer,
    auto_advance: Option<AutoAdvance>,
    outbox: Vec<SessionEvent>,
    dropped: usize,
    completed: bool,
    transliterator: Option<Box<dyn Transliterator>>,
}

impl Session {
    /// Normalize `items` and start a session on the first card.
    pub fn start(
        items: &[RawItem],
        mode: StudyMode,
        settings: EngineSettings,
    ) -> Result<Self, EmptySessionError> {
        let normalized = normalize_all(items);
        let dropped = normalized.dropped();
        if normalized.cards.is_empty() {
            return Err(EmptySessionError { dropped });
        }

        let id = Uuid::new_v4();
        info!(
            session = %id,
            mode = mode.as_str(),
            cards = normalized.cards.len(),
            dropped,
            "study session started"
        );

        let mut session = Self {
            id,
            mode,
            transition: TransitionController::new(settings.phase_delay()),
            settings,
            rule: IntervalRule::default(),
            cards: normalized.cards,
            current_index: 0,
            ledger: BTreeMap::new(),
            stats: SessionStats::default(),
            seen: BTreeSet::new(),
            answer: CardAnswer::None,
            auto_advance: None,
            outbox: Vec::new(),
            dropped,
            completed: false,
            transliterator: None,
        };
        session.enter_card(0);
        Ok(session)
    }

    /// Install the adapter used for phonetic typed responses.
    pub fn with_transliterator(mut self, adapter: impl Transliterator + 'static) -> Self {
        self.transliterator = Some(Box::new(adapter));
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_card(&self) -> &Card {
        &self.cards[self.current_index]
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.cards.len()
    }

    pub fn transition_state(&self) -> TransitionState {
        self.transition.state()
    }

    pub fn face(&self) -> Face {
        self.transition.face()
    }

    pub fn motion(&self) -> Motion {
        self.transition.motion()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn grade(&self, index: usize) -> Option<&Grade> {
        self.ledger.get(&index)
    }

    pub fn confidence(&self, index: usize) -> Option<Confidence> {
        self.ledger.get(&index).map(|g| g.confidence)
    }

    /// Sparse index to confidence mapping.
    pub fn confidence_by_index(&self) -> BTreeMap<usize, Confidence> {
        self.ledger
            .iter()
            .map(|(index, grade)| (*index, grade.confidence))
            .collect()
    }

    /// Options of the current card, once rendered.
    pub fn choices(&self) -> Option<&ChoiceSet> {
        match &self.answer {
            CardAnswer::Choices(set) => Some(set),
            _ => None,
        }
    }

    /// Why the current card has no options, if building them failed.
    pub fn choices_unavailable(&self) -> Option<&InsufficientOptions> {
        match &self.answer {
            CardAnswer::ChoicesUnavailable(err) => Some(err),
            _ => None,
        }
    }

    /// Typed input of the current card, graded or not.
    pub fn typed_input(&self) -> Option<&TypedInput> {
        match &self.answer {
            CardAnswer::Typing(input) | CardAnswer::TypedGraded { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Result of the last typed submission on the current card.
    pub fn typed_result(&self) -> Option<&MatchResult> {
        match &self.answer {
            CardAnswer::TypedGraded { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Earliest pending deadline, if any timer is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        let advance = self.auto_advance.map(|a| a.deadline);
        match (self.transition.next_deadline(), advance) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Snapshot used to resolve key events.
    pub fn dispatch_context(&self) -> DispatchContext {
        let answer = match &self.answer {
            CardAnswer::None | CardAnswer::ChoicesUnavailable(_) => AnswerPhase::None,
            CardAnswer::Choices(set) if set.is_locked() => AnswerPhase::Locked,
            CardAnswer::Choices(set) => AnswerPhase::Choosing {
                options: set.options.len(),
            },
            CardAnswer::Typing(input) => AnswerPhase::Typing {
                empty: input.raw().is_empty(),
            },
            CardAnswer::TypedGraded { .. } => AnswerPhase::Locked,
        };
        DispatchContext {
            mode: self.mode,
            face: self.transition.face(),
            transitioning: !self.transition.is_idle(),
            answer,
        }
    }

    /// Resolve and apply a key event. Returns whether it had an effect.
    pub fn handle_key(&mut self, key: Key, now: Instant) -> bool {
        let Some(action) = resolve(&self.dispatch_context(), key) else {
            debug!(session = %self.id, ?key, "key ignored");
            return false;
        };

        match action {
            Action::Flip => self.flip(),
            Action::Next => self.next(now),
            Action::Previous => self.previous(now),
            Action::Rate(difficulty) => self.submit_difficulty(difficulty, now),
            Action::Select(index) => self.select_choice(index, now).is_some(),
            Action::Type(c) => self.type_text(c.encode_utf8(&mut [0; 4])),
            Action::Erase => self.erase(),
            Action::SubmitTyped => self.submit_typed(now).is_some(),
        }
    }

    pub fn flip(&mut self) -> bool {
        self.transition.flip()
    }

    /// Move to the next card, or mark the session completed on the last one.
    pub fn next(&mut self, now: Instant) -> bool {
        if !self.transition.is_idle() {
            return false;
        }
        if self.is_last() {
            self.complete();
            return false;
        }
        self.auto_advance = None;
        self.transition.begin(Direction::Forward, now)
    }

    /// Move to the previous card. No-op on the first card.
    pub fn previous(&mut self, now: Instant) -> bool {
        if !self.transition.is_idle() || self.current_index == 0 {
            return false;
        }
        self.auto_advance = None;
        self.transition.begin(Direction::Backward, now)
    }

    /// Record a Quiz-mode self assessment and schedule the advance.
    pub fn submit_confidence(&mut self, mark: QuizMark, now: Instant) -> bool {
        if self.mode != StudyMode::Quiz || !self.accepts_grade() {
            return false;
        }
        self.record(Confidence::Quiz(mark), GradeSource::SelfAssessed);
        self.schedule_advance(now);
        true
    }

    /// Skip the current Quiz card, e.g. when it has too few options.
    pub fn skip(&mut self, now: Instant) -> bool {
        self.submit_confidence(QuizMark::Skipped, now)
    }

    /// Rate the current card in Interval mode. Requires the back face.
    pub fn submit_difficulty(&mut self, difficulty: Difficulty, now: Instant) -> bool {
        if self.mode != StudyMode::Interval
            || self.transition.face() != Face::Back
            || !self.accepts_grade()
        {
            debug!(session = %self.id, ?difficulty, "rating ignored");
            return false;
        }
        self.record(Confidence::Interval(difficulty), GradeSource::SelfAssessed);
        self.schedule_advance(now);
        true
    }

    /// Build options for the current card from the other cards' answers.
    ///
    /// `Ok(None)` means the current card is not a multiple-choice card.
    pub fn render_choices<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<&ChoiceSet>, InsufficientOptions> {
        if !self.takes_choices() {
            return Ok(None);
        }
        if matches!(self.answer, CardAnswer::None) {
            match build_choices(&self.cards, self.current_index, self.settings.option_count, rng) {
                Ok(set) => self.answer = CardAnswer::Choices(set),
                Err(err) => {
                    debug!(session = %self.id, %err, "multiple choice degraded to skip");
                    self.answer = CardAnswer::ChoicesUnavailable(err);
                }
            }
        }
        match &self.answer {
            CardAnswer::Choices(set) => Ok(Some(set)),
            CardAnswer::ChoicesUnavailable(err) => Err(err.clone()),
            _ => Ok(None),
        }
    }

    /// Present caller-supplied options for the current card.
    pub fn present_choices(&mut self, options: Vec<String>) -> Result<bool, InsufficientOptions> {
        if !self.takes_choices() || !matches!(self.answer, CardAnswer::None) {
            return Ok(false);
        }
        let required = self.settings.option_count.max(2);
        if options.len() < required {
            let err = InsufficientOptions {
                available: options.len(),
                required,
            };
            self.answer = CardAnswer::ChoicesUnavailable(err.clone());
            return Err(err);
        }
        self.answer = CardAnswer::Choices(ChoiceSet::new(options));
        Ok(true)
    }

    /// Grade the option at `index`. Returns whether it was correct.
    pub fn select_choice(&mut self, index: usize, now: Instant) -> Option<bool> {
        if !self.transition.is_idle() || self.grade_locked() {
            return None;
        }
        let canonical = self.cards[self.current_index].canonical_answer.clone();
        let CardAnswer::Choices(set) = &mut self.answer else {
            return None;
        };
        let correct = set.select(index, &canonical)?;
        let option = set.options[index].clone();

        debug!(session = %self.id, index, correct, "option selected");
        self.record(
            Confidence::Quiz(QuizMark::from_correct(correct)),
            GradeSource::Choice { option },
        );
        self.schedule_advance(now);
        Some(correct)
    }

    /// Append text to the typed response of the current card.
    pub fn type_text(&mut self, chunk: &str) -> bool {
        if !self.transition.is_idle() {
            return false;
        }
        let phonetic = self.cards[self.current_index].expects_phonetic();
        let adapter = if phonetic {
            self.transliterator.as_deref()
        } else {
            None
        };
        match &mut self.answer {
            CardAnswer::Typing(input) => {
                input.push_str(chunk, adapter);
                true
            }
            _ => false,
        }
    }

    /// Remove the last typed keystroke.
    pub fn erase(&mut self) -> bool {
        let phonetic = self.cards[self.current_index].expects_phonetic();
        let adapter = if phonetic {
            self.transliterator.as_deref()
        } else {
            None
        };
        match &mut self.answer {
            CardAnswer::Typing(input) => input.backspace(adapter),
            _ => false,
        }
    }

    /// Grade the typed response. Blank input is ignored.
    ///
    /// A correct answer schedules the advance; an incorrect one stays on the
    /// card so it can be overruled with [`mark_correct`](Self::mark_correct).
    pub fn submit_typed(&mut self, now: Instant) -> Option<bool> {
        if !self.transition.is_idle() || self.grade_locked() {
            return None;
        }
        let CardAnswer::Typing(input) = &self.answer else {
            return None;
        };
        let result = grade_typed(
            input,
            &self.cards[self.current_index],
            self.settings.matching_mode,
            self.settings.fuzzy_threshold,
        )?;
        let input = input.clone();
        let correct = result.is_correct;

        debug!(session = %self.id, correct, similarity = result.similarity, "typed answer graded");
        self.record(
            Confidence::Quiz(QuizMark::from_correct(correct)),
            GradeSource::Typed {
                answer: input.composed().to_string(),
            },
        );
        self.answer = CardAnswer::TypedGraded { input, result };
        if correct {
            self.schedule_advance(now);
        }
        Some(correct)
    }

    /// Overrule an incorrect typed grading on the current card.
    ///
    /// Moves the card's contribution from incorrect to correct. No-op for
    /// any other grade, including one already marked correct.
    pub fn mark_correct(&mut self) -> bool {
        let Some(grade) = self.ledger.get_mut(&self.current_index) else {
            return false;
        };
        let wrong = Confidence::Quiz(QuizMark::Unknown);
        if grade.confidence != wrong || !matches!(grade.source, GradeSource::Typed { .. }) {
            return false;
        }

        let right = Confidence::Quiz(QuizMark::Known);
        grade.confidence = right;
        self.stats.retract(wrong);
        self.stats.record(right);
        if let CardAnswer::TypedGraded { result, .. } = &mut self.answer {
            result.is_correct = true;
        }
        debug!(session = %self.id, index = self.current_index, "typed grading overruled");
        true
    }

    /// Fire every deadline that has passed, oldest first.
    pub fn poll(&mut self, now: Instant) -> Vec<SessionEvent> {
        loop {
            let transition_due = self.transition.next_deadline().filter(|d| *d <= now);
            let advance_due = self.auto_advance.map(|a| a.deadline).filter(|d| *d <= now);
            match (transition_due, advance_due) {
                (None, None) => break,
                (Some(t), Some(a)) if a < t => self.fire_auto_advance(),
                (Some(_), _) => self.fire_transition(now),
                (None, Some(_)) => self.fire_auto_advance(),
            }
        }
        std::mem::take(&mut self.outbox)
    }

    /// End the session. Pending timers die with it.
    pub fn exit(mut self) -> SessionReport {
        self.transition.cancel();
        self.auto_advance = None;

        let reviewed = self
            .ledger
            .iter()
            .filter(|(_, grade)| matches!(grade.confidence, Confidence::Interval(_)))
            .map(|(index, _)| ReviewedCard {
                id: self.cards[*index].id.clone(),
                schedule: self.cards[*index].schedule.clone(),
            })
            .collect();

        let report = SessionReport {
            session_id: self.id,
            mode: self.mode,
            stats: self.stats,
            cards_seen: self.seen.len(),
            total_cards: self.cards.len(),
            completed: self.completed,
            dropped: self.dropped,
            reviewed,
        };
        info!(
            session = %report.session_id,
            graded = report.stats.total(),
            cards_seen = report.cards_seen,
            completed = report.completed,
            "study session ended"
        );
        report
    }

    fn takes_choices(&self) -> bool {
        self.mode == StudyMode::Quiz
            && self.settings.quiz_format == QuizFormat::MultipleChoice
            && self.cards[self.current_index].kind == CardKind::Vocabulary
    }

    /// A grade was just given and its auto-advance is still pending.
    fn grade_locked(&self) -> bool {
        self.auto_advance
            .is_some_and(|a| a.index == self.current_index)
    }

    fn accepts_grade(&self) -> bool {
        self.transition.is_idle() && !self.grade_locked()
    }

    /// Replace the ledger entry for the current card. Stats count the latest
    /// grade only; interval ratings always build on the current schedule.
    fn record(&mut self, confidence: Confidence, source: GradeSource) {
        let index = self.current_index;
        if let Some(previous) = self.ledger.remove(&index) {
            self.stats.retract(previous.confidence);
        }

        if let Confidence::Interval(difficulty) = confidence {
            let card = &mut self.cards[index];
            card.schedule = self.rule.schedule(&card.schedule, difficulty, Utc::now());
            debug!(
                session = %self.id,
                card = %card.id,
                interval = card.schedule.interval,
                repetitions = card.schedule.repetitions,
                "card rescheduled"
            );
        }

        self.stats.record(confidence);
        self.ledger.insert(index, Grade { confidence, source });
    }

    fn schedule_advance(&mut self, now: Instant) {
        self.auto_advance = Some(AutoAdvance {
            index: self.current_index,
            deadline: now + self.settings.advance_delay(),
        });
    }

    fn fire_auto_advance(&mut self) {
        let Some(advance) = self.auto_advance.take() else {
            return;
        };
        if advance.index != self.current_index || !self.transition.is_idle() {
            return;
        }
        if self.is_last() {
            self.complete();
        } else {
            self.transition.begin(Direction::Forward, advance.deadline);
        }
    }

    fn fire_transition(&mut self, now: Instant) {
        match self.transition.poll(now) {
            Some(TransitionEvent::Midpoint(direction)) => {
                let index = match direction {
                    Direction::Forward => self.current_index + 1,
                    Direction::Backward => self.current_index.saturating_sub(1),
                };
                self.enter_card(index.min(self.cards.len() - 1));
                self.outbox.push(SessionEvent::Advanced {
                    index: self.current_index,
                });
            }
            Some(TransitionEvent::Settled(_)) => {
                self.outbox.push(SessionEvent::Settled {
                    index: self.current_index,
                });
            }
            None => {}
        }
    }

    fn enter_card(&mut self, index: usize) {
        self.current_index = index;
        self.seen.insert(index);
        self.auto_advance = None;
        self.answer = if self.mode == StudyMode::Quiz
            && self.settings.quiz_format == QuizFormat::TypedResponse
            && self.cards[index].kind == CardKind::Vocabulary
        {
            CardAnswer::Typing(TypedInput::default())
        } else {
            CardAnswer::None
        };
        debug!(session = %self.id, index, "card entered");
    }

    fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        info!(session = %self.id, graded = self.stats.total(), "study session completed");
        self.outbox.push(SessionEvent::Completed {
            stats: self.stats.clone(),
        });
    }
}
