//! Test Data Factory
//!
//! Deterministic card data and a controllable clock, so review journeys can
//! step through days without waiting for them.

use chrono::{DateTime, Duration, TimeZone, Utc};
use flash_core::{Deck, Grade, Pool};

/// A clock that only moves when told to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestClock {
    now: DateTime<Utc>,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    /// Starts at 2024-01-01 09:00 UTC
    pub fn new() -> Self {
        Self {
            now: Utc
                .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
                .single()
                .expect("valid start time"),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn advance(&mut self, by: Duration) -> DateTime<Utc> {
        self.now += by;
        self.now
    }

    pub fn advance_days(&mut self, days: i64) -> DateTime<Utc> {
        self.advance(Duration::days(days))
    }
}

/// Factory for creating test data
pub struct TestDataFactory;

const WORDS: &[(&str, &str)] = &[
    ("el perro", "the dog"),
    ("el gato", "the cat"),
    ("la casa", "the house"),
    ("el libro", "the book"),
    ("la mesa", "the table"),
    ("el agua", "the water"),
    ("la calle", "the street"),
    ("el tiempo", "the weather"),
    ("la noche", "the night"),
    ("el dia", "the day"),
];

impl TestDataFactory {
    /// `count` distinct label pairs; `seed` shifts where the list starts
    pub fn vocabulary(count: usize, seed: usize) -> Vec<(String, String)> {
        (0..count)
            .map(|i| {
                let (front, back) = WORDS[(i + seed) % WORDS.len()];
                let round = (i + seed) / WORDS.len();
                if round == 0 {
                    (front.to_string(), back.to_string())
                } else {
                    (format!("{front} ({round})"), format!("{back} ({round})"))
                }
            })
            .collect()
    }

    /// A deck of `count` new cards
    pub fn create_deck(name: &str, count: usize) -> Deck {
        let mut deck = Deck::new(name);
        for (front, back) in Self::vocabulary(count, 0) {
            deck.add_card(&front, &back).expect("vocabulary labels are non-empty");
        }
        deck
    }

    /// A deck with every pool populated:
    /// 2 new, 2 failed, 2 due, 4 scheduled, swept at `now - 20h`
    pub fn create_mixed_deck(name: &str, now: DateTime<Utc>) -> Deck {
        let mut deck = Self::create_deck(name, 10);

        for _ in 0..2 {
            deck.review_next(Pool::New, Grade::Bad, now).expect("new pool has cards");
        }
        for hours in [30, 1, 50, 2, 70, 3] {
            deck.review_next(Pool::New, Grade::Good, now - Duration::hours(hours))
                .expect("new pool has cards");
        }
        // due at now-26h and now-46h; the rest stay scheduled
        deck.check_repetitions(now - Duration::hours(20));
        deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_distinct() {
        let words = TestDataFactory::vocabulary(25, 3);
        let mut fronts: Vec<_> = words.iter().map(|(front, _)| front.clone()).collect();
        fronts.sort();
        fronts.dedup();
        assert_eq!(fronts.len(), 25);
    }

    #[test]
    fn test_mixed_deck_pools() {
        let now = TestClock::new().now();
        let deck = TestDataFactory::create_mixed_deck("mixed", now);

        assert_eq!(deck.pool_len(Pool::New), 2);
        assert_eq!(deck.pool_len(Pool::Failed), 2);
        assert_eq!(deck.pool_len(Pool::Due), 2);
        assert_eq!(deck.pool_len(Pool::Scheduled), 4);
    }
}
