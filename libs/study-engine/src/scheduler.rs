//! Interval scheduling for Interval-mode reviews.
//!
//! A reduced SM-2 style rule: intervals grow by a fixed multiplier per
//! rating, `again` resets the card, and the ease factor is left untouched.

use crate::types::{Card, Difficulty, Schedule};
use chrono::{DateTime, Utc};

/// Interval multipliers applied per rating.
#[derive(Debug, Clone)]
pub struct IntervalRule {
    pub minimum_interval: f64,
    pub hard_multiplier: f64,
    pub good_multiplier: f64,
    pub easy_multiplier: f64,
}

impl Default for IntervalRule {
    fn default() -> Self {
        Self {
            minimum_interval: 1.0,
            hard_multiplier: 1.2,
            good_multiplier: 2.5,
            easy_multiplier: 3.5,
        }
    }
}

impl IntervalRule {
    /// Compute the schedule that follows a review.
    pub fn schedule(&self, state: &Schedule, difficulty: Difficulty, now: DateTime<Utc>) -> Schedule {
        let (interval, repetitions) = match difficulty {
            Difficulty::Again => (self.minimum_interval, 0),
            Difficulty::Hard => (
                (state.interval * self.hard_multiplier).max(self.minimum_interval),
                state.repetitions,
            ),
            Difficulty::Good => (
                state.interval * self.good_multiplier,
                state.repetitions + 1,
            ),
            Difficulty::Easy => (
                state.interval * self.easy_multiplier,
                state.repetitions + 1,
            ),
        };

        Schedule {
            // Guards schedules that entered below the floor.
            interval: interval.max(self.minimum_interval),
            ease_factor: state.ease_factor,
            repetitions,
            last_reviewed: Some(now),
        }
    }
}

/// Rate a card with the default rule, returning the updated card.
pub fn rate(card: &Card, difficulty: Difficulty, now: DateTime<Utc>) -> Card {
    Card {
        schedule: IntervalRule::default().schedule(&card.schedule, difficulty, now),
        ..card.clone()
    }
}
