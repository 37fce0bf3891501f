//! Timed slide/flip state machine for the visible card.
//!
//! A navigation runs in two phases of equal length. The card slides out, the
//! index changes at the midpoint, and the next card slides in from the
//! opposite side. Requests arriving while a slide is in progress are
//! rejected, never queued.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Visible side of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    #[default]
    Front,
    Back,
}

impl Face {
    fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Slide phase of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    #[default]
    Idle,
    SlideOutLeft,
    SlideInRight,
    SlideOutRight,
    SlideInLeft,
}

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn slide_out(self) -> Motion {
        match self {
            Self::Forward => Motion::SlideOutLeft,
            Self::Backward => Motion::SlideOutRight,
        }
    }

    fn slide_in(self) -> Motion {
        match self {
            Self::Forward => Motion::SlideInRight,
            Self::Backward => Motion::SlideInLeft,
        }
    }
}

/// Face and motion as observed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransitionState {
    pub face: Face,
    pub motion: Motion,
}

/// Phase boundary crossed by [`TransitionController::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// Slide-out finished; the caller moves the index now.
    Midpoint(Direction),
    /// Slide-in finished; input is accepted again.
    Settled(Direction),
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    direction: Direction,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct TransitionController {
    state: TransitionState,
    phase_delay: Duration,
    pending: Option<Pending>,
}

impl TransitionController {
    pub fn new(phase_delay: Duration) -> Self {
        Self {
            state: TransitionState::default(),
            phase_delay,
            pending: None,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn face(&self) -> Face {
        self.state.face
    }

    pub fn motion(&self) -> Motion {
        self.state.motion
    }

    pub fn is_idle(&self) -> bool {
        self.state.motion == Motion::Idle
    }

    /// Deadline of the running phase, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Toggle the face. Ignored while a slide is running.
    pub fn flip(&mut self) -> bool {
        if !self.is_idle() {
            debug!(motion = ?self.state.motion, "flip rejected during transition");
            return false;
        }
        self.state.face = self.state.face.flipped();
        true
    }

    /// Start sliding out. Ignored while a slide is running.
    pub fn begin(&mut self, direction: Direction, now: Instant) -> bool {
        if !self.is_idle() {
            debug!(?direction, motion = ?self.state.motion, "navigation rejected during transition");
            return false;
        }
        self.state.motion = direction.slide_out();
        self.pending = Some(Pending {
            direction,
            deadline: now + self.phase_delay,
        });
        true
    }

    /// Fire the next phase boundary if its deadline has passed.
    ///
    /// Call repeatedly until it returns `None` to catch up on elapsed phases.
    pub fn poll(&mut self, now: Instant) -> Option<TransitionEvent> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }

        let direction = pending.direction;
        if self.state.motion == direction.slide_out() {
            self.state = TransitionState {
                face: Face::Front,
                motion: direction.slide_in(),
            };
            self.pending = Some(Pending {
                direction,
                deadline: pending.deadline + self.phase_delay,
            });
            Some(TransitionEvent::Midpoint(direction))
        } else {
            self.state.motion = Motion::Idle;
            self.pending = None;
            Some(TransitionEvent::Settled(direction))
        }
    }

    /// Drop any running slide and return to idle.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.state.motion = Motion::Idle;
    }
}
