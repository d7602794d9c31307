// File: ./src/storage/mod.rs
//! SQLite persistence for the key-value table, scratchpad notes, task lists
//! and calendar events.
//!
//! All access goes through one connection guarded by a mutex, so a single
//! `Storage` can be shared behind an `Arc` by the bridge.
mod calendar;
mod kv;
mod notes;
mod schema;
mod task_lists;

pub use calendar::{CalendarEvent, CalendarEventUpdate, NewCalendarEvent};
pub use notes::ScratchpadNote;
pub use schema::SCHEMA_VERSION;
pub use task_lists::TaskList;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        log::info!("Opened database {:?}", path);
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A panic while holding the lock leaves SQLite itself consistent, so a
    /// poisoned mutex is recovered rather than propagated.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn schema_version(&self) -> Result<u32> {
        schema::current_version(&self.conn())
    }
}
