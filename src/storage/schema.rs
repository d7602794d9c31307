// File: ./src/storage/schema.rs
// Versioned schema migrations, tracked in `PRAGMA user_version`.
//
// Never edit a shipped migration: append a new one and the version follows.
use anyhow::{Context, Result};
use rusqlite::Connection;

const MIGRATIONS: &[&str] = &[
    // v1: key-value settings
    "CREATE TABLE IF NOT EXISTS kv_storage (
        key TEXT PRIMARY KEY,
        value TEXT
    );",
    // v2: scratchpad notes
    "CREATE TABLE IF NOT EXISTS scratchpad_notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );",
    // v3: task lists
    "CREATE TABLE IF NOT EXISTS task_lists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );",
    // v4: user-defined task list order
    "ALTER TABLE task_lists ADD COLUMN display_order INTEGER NOT NULL DEFAULT 0;",
    // v5: calendar events
    "CREATE TABLE IF NOT EXISTS calendar_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        is_urgent_pin INTEGER NOT NULL DEFAULT 0,
        is_future_reminder_pin INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_calendar_events_date ON calendar_events(date);",
];

pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

pub(super) fn current_version(conn: &Connection) -> Result<u32> {
    Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}

/// Applies every migration newer than the database, each in its own
/// transaction.
pub(super) fn migrate(conn: &mut Connection) -> Result<()> {
    let from = current_version(conn)?;
    if from > SCHEMA_VERSION {
        anyhow::bail!(
            "Database schema v{} is newer than this build (v{})",
            from,
            SCHEMA_VERSION
        );
    }

    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(from as usize) {
        let version = idx as u32 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .with_context(|| format!("Migration to v{} failed", version))?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        log::info!("Migrated database schema to v{}", version);
    }
    Ok(())
}
