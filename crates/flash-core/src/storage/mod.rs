//! Storage Module
//!
//! Deck persistence behind the [`DeckStore`] trait:
//! - [`SqliteStore`]: SQLite database, schema managed by ordered migrations
//! - [`MemoryStore`]: in-process map, for tests and throwaway sessions
//!
//! Stores are constructed explicitly and handed to whoever needs them.

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use migrations::{Migration, MIGRATIONS};
pub use sqlite::{SqliteStore, DATABASE_FILE};

use chrono::{DateTime, Utc};

use crate::deck::{Deck, DeckError, DeckSummary};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// No deck with this name
    #[error("Deck not found: {0}")]
    DeckNotFound(String),
    /// A deck with this name already exists
    #[error("Deck already exists: {0}")]
    DeckExists(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// A stored row that cannot be turned back into a card
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    /// Stored pools do not form a valid deck
    #[error("Corrupt deck: {0}")]
    Corrupt(#[from] DeckError),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// DECK STORE
// ============================================================================

/// Load and save whole decks by name.
///
/// `load` after `save` returns a deck with the same pools in the same order
/// and every card field unchanged.
pub trait DeckStore {
    /// Load the deck stored under `name`
    fn load(&self, name: &str) -> Result<Deck>;

    /// Store `deck` under `name`, replacing whatever was there
    fn save(&self, name: &str, deck: &Deck) -> Result<()>;

    /// Remove a deck. Returns false if there was nothing to remove.
    fn delete(&self, name: &str) -> Result<bool>;

    /// All deck names, sorted
    fn list_names(&self) -> Result<Vec<String>>;

    /// Move a deck to a new name
    fn rename(&self, old: &str, new: &str) -> Result<()>;

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_names()?.iter().any(|existing| existing == name))
    }

    /// Create and store an empty deck, refusing to overwrite an existing one
    fn create(&self, name: &str) -> Result<Deck> {
        if self.exists(name)? {
            return Err(StorageError::DeckExists(name.to_string()));
        }
        let deck = Deck::new(name);
        self.save(name, &deck)?;
        tracing::info!(deck = name, "Deck created");
        Ok(deck)
    }

    /// Summaries of every deck, in name order
    fn summaries(&self, now: DateTime<Utc>) -> Result<Vec<DeckSummary>> {
        self.list_names()?
            .iter()
            .map(|name| {
                let mut summary = self.load(name)?.summary(now);
                summary.name = name.clone();
                Ok(summary)
            })
            .collect()
    }
}
