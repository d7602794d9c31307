// File: ./src/storage/notes.rs
use super::Storage;
use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchpadNote {
    pub id: i64,
    pub content: String,
    pub created_at: String,
}

impl ScratchpadNote {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            content: row.get::<_, Option<String>>("content")?.unwrap_or_default(),
            created_at: row.get("created_at")?,
        })
    }
}

const SELECT_NOTE: &str = "SELECT id, content, created_at FROM scratchpad_notes";

impl Storage {
    /// Oldest first.
    pub fn scratchpad_notes(&self) -> Result<Vec<ScratchpadNote>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{} ORDER BY created_at ASC, id ASC", SELECT_NOTE))?;
        let notes = stmt
            .query_map([], ScratchpadNote::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notes)
    }

    pub fn add_scratchpad_note(&self, content: &str) -> Result<ScratchpadNote> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO scratchpad_notes (content) VALUES (?1)",
            [content],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_NOTE),
            [id],
            ScratchpadNote::from_row,
        )?)
    }

    pub fn update_scratchpad_note(&self, id: i64, content: &str) -> Result<Option<ScratchpadNote>> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE scratchpad_notes SET content = ?1 WHERE id = ?2",
            params![content, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_NOTE),
                [id],
                ScratchpadNote::from_row,
            )
            .optional()?)
    }

    pub fn delete_scratchpad_note(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM scratchpad_notes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_lifecycle() {
        let db = Storage::open_in_memory().unwrap();
        let a = db.add_scratchpad_note("first").unwrap();
        let b = db.add_scratchpad_note("second").unwrap();
        assert!(!a.created_at.is_empty());

        let updated = db.update_scratchpad_note(a.id, "first!").unwrap().unwrap();
        assert_eq!(updated.content, "first!");
        assert!(db.update_scratchpad_note(999, "x").unwrap().is_none());

        let ids: Vec<i64> = db.scratchpad_notes().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        assert!(db.delete_scratchpad_note(b.id).unwrap());
        assert!(!db.delete_scratchpad_note(b.id).unwrap());
        assert_eq!(db.scratchpad_notes().unwrap().len(), 1);
    }
}
