//! # Flash Core
//!
//! Spaced repetition engine for flashcard decks.
//!
//! - **Adaptable Priority Queue**: binary min-heap with stable handles, so a
//!   card's due time can be changed or the card removed without a search
//! - **Interval Algorithm**: SM-2 style scheduling on a three-level grade
//!   (0 = bad, 1 = medium, 2 = good)
//! - **Decks**: four disjoint pools (new, failed, due, scheduled) and the
//!   review state machine moving cards between them
//! - **Storage**: decks persisted to SQLite behind the [`DeckStore`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use flash_core::{Deck, DeckStore, Grade, Pool, SqliteStore};
//!
//! let store = SqliteStore::in_memory()?;
//! let mut deck = store.create("spanish")?;
//! deck.add_card("hola", "hello")?;
//!
//! let prompt = deck.prompt(Pool::New)?;
//! assert_eq!(prompt.front, "hola");
//!
//! let outcome = deck.review_next(Pool::New, Grade::Good, Utc::now())?;
//! assert_eq!(outcome.pool, Pool::Scheduled);
//!
//! store.save("spanish", &deck)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): compile SQLite from source

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod deck;
pub mod queue;
pub mod scheduling;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Queues
pub use queue::{AdaptablePriorityQueue, Element, FifoQueue, Handle, QueueError};

// Scheduling
pub use scheduling::{
    due_after, latest_due, Grade, GradeError, IntervalAlgorithm, IntervalParameters, ReviewState,
};

// Decks
pub use deck::{
    Card, CardId, Deck, DeckError, DeckSnapshot, DeckSummary, Pool, ReviewOutcome, ReviewPrompt,
    ScheduledCard,
};

// Storage layer
pub use storage::{DeckStore, MemoryStore, SqliteStore, StorageError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Card, CardId, Deck, DeckError, DeckStore, Grade, Pool, Result, SqliteStore, StorageError,
    };
}

/// Crate-level result, used where deck and storage errors meet
pub type Result<T> = std::result::Result<T, StorageError>;
