//! SQLite Storage Implementation
//!
//! One row per deck, one row per card. A card row carries its pool and its
//! position within that pool; scheduled cards are written in heap array
//! order together with their due time, so loading rebuilds the same heap.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{DeckStore, Result, StorageError};
use crate::deck::{Card, CardId, Deck, Pool};
use crate::scheduling::{Grade, IntervalAlgorithm, IntervalParameters};

/// File name of the deck database inside a data directory
pub const DATABASE_FILE: &str = "decks.db";

const CARD_COLUMNS: &str = "id, pool, position, front, back, interval, last_grade, \
     last_reviewed, repetition, easiness, created_at, due_at";

// ============================================================================
// STORE
// ============================================================================

/// SQLite-backed [`DeckStore`]
///
/// The connection sits behind a mutex, so a store can be shared by reference.
/// Every save runs in a single transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").field("path", &self.path).finish()
    }
}

impl SqliteStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Open (creating if needed) the database at `db_path`, or at the
    /// platform data directory when no path is given.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        info!(path = %path.display(), "Opening deck store");
        Self::from_connection(conn, Some(path))
    }

    /// Open the database file inside `dir`
    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::new(Some(dir.join(DATABASE_FILE)))
    }

    /// A private database that vanishes with the store
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    /// Platform data directory location of the deck database
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "flash", "flash").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(data_dir, perms);
        }
        Ok(data_dir.join(DATABASE_FILE))
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        Self::configure_connection(&conn)?;
        super::migrations::apply_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file, if the store is file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current schema version
    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.lock()?;
        Ok(super::migrations::get_current_version(&conn)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Init("Connection lock poisoned".into()))
    }
}

impl DeckStore for SqliteStore {
    fn load(&self, name: &str) -> Result<Deck> {
        let conn = self.lock()?;

        let params_json: Option<String> = conn
            .query_row(
                "SELECT interval_params FROM decks WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::DeckNotFound(name.to_string()))?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE deck_name = ?1 ORDER BY position"
        ))?;
        let rows = stmt
            .query_map(params![name], CardRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut new = Vec::new();
        let mut fails = Vec::new();
        let mut due = Vec::new();
        let mut scheduled = Vec::new();
        for row in rows {
            let (pool, due_at, card) = row.into_card()?;
            match pool {
                Pool::New => new.push(card),
                Pool::Failed => fails.push(card),
                Pool::Due => due.push(card),
                Pool::Scheduled => {
                    let due_at = due_at.ok_or_else(|| {
                        StorageError::InvalidRecord(format!(
                            "scheduled card {} has no due time",
                            card.id
                        ))
                    })?;
                    scheduled.push((due_at, card));
                }
            }
        }

        let mut deck = Deck::from_parts(name, new, fails, due, scheduled)?;
        if let Some(json) = params_json {
            let params: IntervalParameters = serde_json::from_str(&json)?;
            deck.set_algorithm(IntervalAlgorithm::new(params));
        }

        debug!(deck = name, cards = deck.check_total_size(), "Deck loaded");
        Ok(deck)
    }

    fn save(&self, name: &str, deck: &Deck) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let now = format_timestamp(&Utc::now());
        let params_json = serde_json::to_string(deck.algorithm().params())?;
        tx.execute(
            "INSERT INTO decks (name, created_at, updated_at, interval_params)
             VALUES (?1, ?2, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                updated_at = excluded.updated_at,
                interval_params = excluded.interval_params",
            params![name, now, params_json],
        )?;
        tx.execute("DELETE FROM cards WHERE deck_name = ?1", params![name])?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO cards (deck_name, {CARD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ))?;
            let mut insert = |pool: Pool,
                              position: usize,
                              card: &Card,
                              due_at: Option<DateTime<Utc>>|
             -> rusqlite::Result<usize> {
                stmt.execute(params![
                    name,
                    card.id.to_string(),
                    pool.as_str(),
                    position as i64,
                    card.front,
                    card.back,
                    card.interval,
                    card.last_grade.map(Grade::as_i64),
                    card.last_reviewed.as_ref().map(format_timestamp),
                    card.repetition,
                    card.easiness,
                    format_timestamp(&card.created_at),
                    due_at.as_ref().map(format_timestamp),
                ])
            };

            for (position, card) in deck.new_cards().enumerate() {
                insert(Pool::New, position, card, None)?;
            }
            for (position, card) in deck.failed_cards().enumerate() {
                insert(Pool::Failed, position, card, None)?;
            }
            for (position, card) in deck.due_cards().enumerate() {
                insert(Pool::Due, position, card, None)?;
            }
            for (position, (due_at, card)) in deck.scheduled_cards().enumerate() {
                insert(Pool::Scheduled, position, card, Some(due_at))?;
            }
        }

        tx.commit()?;
        debug!(deck = name, cards = deck.check_total_size(), "Deck saved");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM decks WHERE name = ?1", params![name])?;
        if removed > 0 {
            info!(deck = name, "Deck deleted");
        }
        Ok(removed > 0)
    }

    fn list_names(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn rename(&self, old: &str, new: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let taken = tx
            .query_row("SELECT 1 FROM decks WHERE name = ?1", params![new], |_| Ok(()))
            .optional()?
            .is_some();
        if taken {
            return Err(StorageError::DeckExists(new.to_string()));
        }

        let renamed = tx.execute(
            "UPDATE decks SET name = ?2, updated_at = ?3 WHERE name = ?1",
            params![old, new, format_timestamp(&Utc::now())],
        )?;
        if renamed == 0 {
            return Err(StorageError::DeckNotFound(old.to_string()));
        }

        tx.commit()?;
        info!(from = old, to = new, "Deck renamed");
        Ok(())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row("SELECT 1 FROM decks WHERE name = ?1", params![name], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

// ============================================================================
// ROW CONVERSION
// ============================================================================

/// Raw column values of one card row
struct CardRow {
    id: String,
    pool: String,
    front: String,
    back: String,
    interval: f64,
    last_grade: Option<i64>,
    last_reviewed: Option<String>,
    repetition: i64,
    easiness: f64,
    created_at: String,
    due_at: Option<String>,
}

impl CardRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            pool: row.get("pool")?,
            front: row.get("front")?,
            back: row.get("back")?,
            interval: row.get("interval")?,
            last_grade: row.get("last_grade")?,
            last_reviewed: row.get("last_reviewed")?,
            repetition: row.get("repetition")?,
            easiness: row.get("easiness")?,
            created_at: row.get("created_at")?,
            due_at: row.get("due_at")?,
        })
    }

    fn into_card(self) -> Result<(Pool, Option<DateTime<Utc>>, Card)> {
        let id: CardId = self
            .id
            .parse()
            .map_err(|e| StorageError::InvalidRecord(format!("card id '{}': {}", self.id, e)))?;
        let pool: Pool = self.pool.parse().map_err(StorageError::InvalidRecord)?;
        let repetition = u32::try_from(self.repetition).map_err(|_| {
            StorageError::InvalidRecord(format!("card {} repetition {}", id, self.repetition))
        })?;
        let last_grade = match self.last_grade {
            Some(value) => Some(Grade::try_from(value).map_err(crate::deck::DeckError::from)?),
            None => None,
        };
        let last_reviewed = self
            .last_reviewed
            .as_deref()
            .map(|value| parse_timestamp(value, "last_reviewed"))
            .transpose()?;
        let due_at = self
            .due_at
            .as_deref()
            .map(|value| parse_timestamp(value, "due_at"))
            .transpose()?;

        let card = Card {
            id,
            front: self.front,
            back: self.back,
            interval: self.interval,
            last_grade,
            last_reviewed,
            repetition,
            easiness: self.easiness,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
        };
        Ok((pool, due_at, card))
    }
}

/// RFC 3339 with as many fractional digits as the value needs
fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse RFC3339 timestamp
fn parse_timestamp(value: &str, field_name: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::InvalidTimestamp(format!("{} '{}': {}", field_name, value, e))
        })
}
