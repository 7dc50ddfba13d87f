//! Serializable deck state
//!
//! The snapshot lists each pool in its own order. Scheduled cards are kept in
//! heap array order so restoring them rebuilds the identical heap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Card, Deck, DeckError};
use crate::scheduling::{IntervalAlgorithm, IntervalParameters};

/// A scheduled card and the time it becomes due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCard {
    pub due_at: DateTime<Utc>,
    pub card: Card,
}

/// Complete, self-describing state of one deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSnapshot {
    pub name: String,
    /// Interval parameters the deck schedules with
    #[serde(default)]
    pub params: IntervalParameters,
    #[serde(default)]
    pub new: Vec<Card>,
    #[serde(default)]
    pub fails: Vec<Card>,
    #[serde(default)]
    pub due: Vec<Card>,
    #[serde(default)]
    pub scheduled: Vec<ScheduledCard>,
}

impl DeckSnapshot {
    pub fn total(&self) -> usize {
        self.new.len() + self.fails.len() + self.due.len() + self.scheduled.len()
    }
}

impl Deck {
    /// Capture the deck's pools and interval parameters
    pub fn snapshot(&self) -> DeckSnapshot {
        DeckSnapshot {
            name: self.name().to_string(),
            params: *self.algorithm().params(),
            new: self.new_cards().cloned().collect(),
            fails: self.failed_cards().cloned().collect(),
            due: self.due_cards().cloned().collect(),
            scheduled: self
                .scheduled_cards()
                .map(|(due_at, card)| ScheduledCard {
                    due_at,
                    card: card.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<DeckSnapshot> for Deck {
    type Error = DeckError;

    fn try_from(snapshot: DeckSnapshot) -> Result<Self, Self::Error> {
        let mut deck = Deck::from_parts(
            snapshot.name,
            snapshot.new,
            snapshot.fails,
            snapshot.due,
            snapshot
                .scheduled
                .into_iter()
                .map(|entry| (entry.due_at, entry.card))
                .collect(),
        )?;
        deck.set_algorithm(IntervalAlgorithm::new(snapshot.params));
        Ok(deck)
    }
}
