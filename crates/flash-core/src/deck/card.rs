//! Card - the reviewable unit
//!
//! Each card carries:
//! - A front/back label pair
//! - Scheduling state (interval, repetition count, easiness)
//! - The last grade and review time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduling::{Grade, ReviewState, INITIAL_EASINESS};

// ============================================================================
// CARD IDENTITY
// ============================================================================

/// Stable card identity (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    /// Generate a fresh identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CardId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ============================================================================
// CARD
// ============================================================================

/// A flashcard and its scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Stable identity, independent of the labels
    pub id: CardId,
    /// Prompt side
    pub front: String,
    /// Answer side
    pub back: String,
    /// Days until the next review
    pub interval: f64,
    /// Grade given at the most recent review
    pub last_grade: Option<Grade>,
    /// When the card was last reviewed
    pub last_reviewed: Option<DateTime<Utc>>,
    /// Consecutive successful recalls
    pub repetition: u32,
    /// Interval growth multiplier (>= 1.3)
    pub easiness: f64,
    /// When the card was added
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Create an unreviewed card
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: CardId::new(),
            front: front.into(),
            back: back.into(),
            interval: 0.0,
            last_grade: None,
            last_reviewed: None,
            repetition: 0,
            easiness: INITIAL_EASINESS,
            created_at: Utc::now(),
        }
    }

    /// The label opposite to `label`, if `label` is one of this card's sides
    pub fn other_side(&self, label: &str) -> Option<&str> {
        if label == self.front {
            Some(&self.back)
        } else if label == self.back {
            Some(&self.front)
        } else {
            None
        }
    }

    /// True if the card has exactly these labels
    pub fn has_labels(&self, front: &str, back: &str) -> bool {
        self.front == front && self.back == back
    }

    /// Scheduling fields as read by the interval algorithm
    pub fn review_state(&self) -> ReviewState {
        ReviewState {
            repetition: self.repetition,
            easiness: self.easiness,
            interval: self.interval,
        }
    }
}
