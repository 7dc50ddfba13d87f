//! Database Migrations
//!
//! Ordered schema changes, applied once each when a store is opened.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Decks and cards with pool positions",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Per-deck interval parameters",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
///
/// Each card row records its pool and its position in that pool. For the
/// scheduled pool the position is the heap array index.
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS decks (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cards (
    deck_name TEXT NOT NULL REFERENCES decks(name) ON DELETE CASCADE ON UPDATE CASCADE,
    id TEXT NOT NULL,
    pool TEXT NOT NULL CHECK (pool IN ('new', 'failed', 'due', 'scheduled')),
    position INTEGER NOT NULL,
    front TEXT NOT NULL,
    back TEXT NOT NULL,
    interval REAL NOT NULL,
    last_grade INTEGER CHECK (last_grade IS NULL OR last_grade BETWEEN 0 AND 2),
    last_reviewed TEXT,
    repetition INTEGER NOT NULL DEFAULT 0,
    easiness REAL NOT NULL,
    created_at TEXT NOT NULL,
    due_at TEXT,
    PRIMARY KEY (deck_name, id)
);

CREATE INDEX IF NOT EXISTS idx_cards_pool ON cards(deck_name, pool, position);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Interval parameters stored as JSON, NULL meaning defaults
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE decks ADD COLUMN interval_params TEXT;

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations, returning how many ran
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
