//! Interval algorithm
//!
//! SM-2 style update on a three-level grade scale. Passing reviews grow the
//! interval (1 day, 6 days, then `interval * easiness`); a failed review
//! resets the card to its first interval.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Grade;
use crate::deck::Card;

/// Easiness never drops below this
pub const MIN_EASINESS: f64 = 1.3;

/// Easiness of a card that has never been reviewed
pub const INITIAL_EASINESS: f64 = 2.5;

/// Interval (days) after the first successful recall
pub const FIRST_INTERVAL: f64 = 1.0;

/// Interval (days) after the second successful recall
pub const SECOND_INTERVAL: f64 = 6.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// 9999-12-31T23:59:59Z, the last instant with a four-digit RFC 3339 year
const LATEST_DUE_SECS: i64 = 253_402_300_799;

/// Tunable constants of the interval algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntervalParameters {
    pub first_interval: f64,
    pub second_interval: f64,
    pub min_easiness: f64,
    pub initial_easiness: f64,
}

impl Default for IntervalParameters {
    fn default() -> Self {
        Self {
            first_interval: FIRST_INTERVAL,
            second_interval: SECOND_INTERVAL,
            min_easiness: MIN_EASINESS,
            initial_easiness: INITIAL_EASINESS,
        }
    }
}

/// The scheduling fields the algorithm reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Consecutive successful recalls
    pub repetition: u32,
    /// Interval growth multiplier
    pub easiness: f64,
    /// Days until the next review
    pub interval: f64,
}

/// Computes the next interval and easiness for a reviewed card
#[derive(Debug, Clone, Default)]
pub struct IntervalAlgorithm {
    params: IntervalParameters,
}

impl IntervalAlgorithm {
    pub fn new(params: IntervalParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IntervalParameters {
        &self.params
    }

    /// Next scheduling state. Pure: depends only on `state` and `grade`.
    pub fn next_state(&self, state: ReviewState, grade: Grade) -> ReviewState {
        if !grade.is_pass() {
            return ReviewState {
                repetition: 0,
                easiness: state.easiness,
                interval: self.params.first_interval,
            };
        }

        let mut easiness = state.easiness;
        let interval = match state.repetition {
            0 => self.params.first_interval,
            1 => self.params.second_interval,
            _ => {
                let grown = state.interval * state.easiness;
                let miss = (Grade::Good.as_i64() - grade.as_i64()) as f64;
                easiness += 0.1 - miss * (0.08 + miss * 0.02);
                easiness = easiness.max(self.params.min_easiness);
                grown
            }
        };

        ReviewState {
            repetition: state.repetition.saturating_add(1),
            easiness,
            interval,
        }
    }

    /// Apply a review to `card`, stamping the grade and review time.
    pub fn apply(&self, mut card: Card, grade: Grade, reviewed_at: DateTime<Utc>) -> Card {
        let next = self.next_state(card.review_state(), grade);
        card.repetition = next.repetition;
        card.easiness = next.easiness;
        card.interval = next.interval;
        card.last_grade = Some(grade);
        card.last_reviewed = Some(reviewed_at);
        card
    }
}

/// Latest due time a card can be given.
///
/// Later instants need a five-digit year, which RFC 3339 cannot express.
pub fn latest_due() -> DateTime<Utc> {
    DateTime::from_timestamp(LATEST_DUE_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// The moment `interval_days` after `from`, saturating at [`latest_due`].
pub fn due_after(from: DateTime<Utc>, interval_days: f64) -> DateTime<Utc> {
    let latest = latest_due();
    let millis = (interval_days.max(0.0) * MILLIS_PER_DAY).round();
    if millis >= i64::MAX as f64 {
        return latest;
    }
    Duration::try_milliseconds(millis as i64)
        .and_then(|offset| from.checked_add_signed(offset))
        .map_or(latest, |due_at| due_at.min(latest))
}
