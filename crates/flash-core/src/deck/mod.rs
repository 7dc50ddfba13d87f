//! Deck module - cards and the pools they move between
//!
//! A deck keeps every card in exactly one of four pools:
//! - **new**: never reviewed
//! - **failed**: last graded bad, retried in FIFO order
//! - **due**: scheduled time has passed, waiting for review
//! - **scheduled**: waiting for its due time (min-heap on due time)

mod card;
mod pools;
mod snapshot;

pub use card::{Card, CardId};
pub use pools::Deck;
pub use snapshot::{DeckSnapshot, ScheduledCard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::QueueError;
use crate::scheduling::{Grade, GradeError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Deck error type
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeckError {
    /// Review or peek requested from an exhausted pool
    #[error("No cards left in the {0} pool")]
    EmptyPool(Pool),
    /// No card with this id in the deck
    #[error("Card not found: {0}")]
    CardNotFound(CardId),
    /// The same card id appears twice
    #[error("Duplicate card: {0}")]
    DuplicateCard(CardId),
    /// Front or back label is blank
    #[error("Card labels must not be empty")]
    EmptyLabel,
    /// Grade outside the accepted range
    #[error(transparent)]
    Grade(#[from] GradeError),
    /// Underlying queue failure
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Deck result type
pub type Result<T> = std::result::Result<T, DeckError>;

// ============================================================================
// POOLS
// ============================================================================

/// The four disjoint card containers of a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    New,
    Failed,
    Due,
    Scheduled,
}

impl Pool {
    /// All pools in display order
    pub const ALL: [Pool; 4] = [Pool::New, Pool::Failed, Pool::Due, Pool::Scheduled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::New => "new",
            Pool::Failed => "failed",
            Pool::Due => "due",
            Pool::Scheduled => "scheduled",
        }
    }
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Pool {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Pool::New),
            "failed" | "fails" => Ok(Pool::Failed),
            "due" => Ok(Pool::Due),
            "scheduled" => Ok(Pool::Scheduled),
            _ => Err(format!("Unknown pool: {}", s)),
        }
    }
}

// ============================================================================
// REVIEW I/O
// ============================================================================

/// What the presentation layer shows for one review step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPrompt {
    pub card_id: CardId,
    pub front: String,
    pub back: String,
    /// Cards left in the pool, including this one
    pub remaining: usize,
}

/// Where a reviewed card went and its new scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub card_id: CardId,
    pub grade: Grade,
    /// Pool the card was moved to
    pub pool: Pool,
    /// Set when the card was scheduled
    pub due_at: Option<DateTime<Utc>>,
    pub interval: f64,
    pub repetition: u32,
    pub easiness: f64,
}

/// Per-deck counts for deck listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub name: String,
    /// Cards across all pools
    pub total: usize,
    /// Cards reviewable now: the due pool plus scheduled cards whose time has come
    pub due: usize,
    pub new: usize,
    pub failed: usize,
    pub scheduled: usize,
    /// Earliest due time still in the future, if any
    pub next_due: Option<DateTime<Utc>>,
}
