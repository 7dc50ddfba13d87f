//! In-process deck store

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{DeckStore, Result, StorageError};
use crate::deck::{Deck, DeckSnapshot};

/// Keeps deck snapshots in a map; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    decks: Mutex<BTreeMap<String, DeckSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn decks(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, DeckSnapshot>>> {
        self.decks
            .lock()
            .map_err(|_| StorageError::Init("Memory store lock poisoned".into()))
    }
}

impl DeckStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Deck> {
        let snapshot = self
            .decks()?
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::DeckNotFound(name.to_string()))?;
        Ok(Deck::try_from(snapshot)?)
    }

    fn save(&self, name: &str, deck: &Deck) -> Result<()> {
        let mut snapshot = deck.snapshot();
        snapshot.name = name.to_string();
        self.decks()?.insert(name.to_string(), snapshot);
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.decks()?.remove(name).is_some())
    }

    fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.decks()?.keys().cloned().collect())
    }

    fn rename(&self, old: &str, new: &str) -> Result<()> {
        let mut decks = self.decks()?;
        if decks.contains_key(new) {
            return Err(StorageError::DeckExists(new.to_string()));
        }
        let mut snapshot = decks
            .remove(old)
            .ok_or_else(|| StorageError::DeckNotFound(old.to_string()))?;
        snapshot.name = new.to_string();
        decks.insert(new.to_string(), snapshot);
        Ok(())
    }
}
