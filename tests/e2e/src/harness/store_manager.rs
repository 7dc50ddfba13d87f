//! Test Store Manager
//!
//! Provides isolated deck stores for testing:
//! - Temporary databases that are automatically cleaned up
//! - Reopening the same file to prove persistence
//! - Pre-seeded decks

use std::path::PathBuf;

use flash_core::{CardId, Deck, DeckStore, SqliteStore};
use tempfile::TempDir;

use crate::mocks::TestDataFactory;

/// Manager for test stores
///
/// Each manager owns its own database file in a temporary directory, which
/// is deleted when the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let mut db = TestStoreManager::new_temp();
/// db.seed_deck("spanish", 10);
/// db.reopen();
/// assert_eq!(db.store.load("spanish")?.check_total_size(), 10);
/// ```
pub struct TestStoreManager {
    /// The store instance
    pub store: SqliteStore,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestStoreManager {
    /// Create a new store in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_decks.db");
        let store = SqliteStore::new(Some(db_path.clone())).expect("Failed to create test store");

        Self {
            store,
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a store at a caller-owned path (not cleaned up)
    pub fn new_at_path(path: PathBuf) -> Self {
        let store = SqliteStore::new(Some(path.clone())).expect("Failed to create test store");
        Self {
            store,
            _temp_dir: None,
            db_path: path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Close the connection and open the same file again
    pub fn reopen(&mut self) {
        self.store = SqliteStore::new(Some(self.db_path.clone())).expect("Failed to reopen store");
    }

    /// True if no deck is stored
    pub fn is_empty(&self) -> bool {
        self.deck_count() == 0
    }

    pub fn deck_count(&self) -> usize {
        self.store.list_names().map(|names| names.len()).unwrap_or(0)
    }

    /// Store a deck of `count` new vocabulary cards
    pub fn seed_deck(&mut self, name: &str, count: usize) -> Vec<CardId> {
        let mut deck = Deck::new(name);
        let ids = TestDataFactory::vocabulary(count, 0)
            .iter()
            .map(|(front, back)| deck.add_card(front, back).expect("Failed to add card"))
            .collect();
        self.store.save(name, &deck).expect("Failed to save deck");
        ids
    }

    /// Load, modify and save a deck in one step
    pub fn update_deck<T>(&self, name: &str, f: impl FnOnce(&mut Deck) -> T) -> T {
        let mut deck = self.store.load(name).expect("Failed to load deck");
        let result = f(&mut deck);
        self.store.save(name, &deck).expect("Failed to save deck");
        result
    }

    /// Delete every deck
    pub fn clear(&mut self) {
        let names = self.store.list_names().unwrap_or_default();
        for name in names {
            let _ = self.store.delete(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_and_reopen() {
        let mut db = TestStoreManager::new_temp();
        assert!(db.is_empty());

        let ids = db.seed_deck("words", 5);
        db.reopen();

        let deck = db.store.load("words").unwrap();
        assert_eq!(deck.check_total_size(), 5);
        assert!(ids.iter().all(|id| deck.card(*id).is_some()));
    }

    #[test]
    fn test_clear() {
        let mut db = TestStoreManager::new_temp();
        db.seed_deck("a", 1);
        db.seed_deck("b", 1);
        db.clear();
        assert!(db.is_empty());
    }
}
