// File: ./src/storage/task_lists.rs
use super::Storage;
use crate::model::{PinnedTask, TaskProgress, collect_pinned, parse_markdown_to_tasks};
use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

/// A named Markdown checklist document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskList {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            content: row.get("content")?,
            display_order: row.get("display_order")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

const SELECT_LIST: &str =
    "SELECT id, name, content, display_order, created_at, updated_at FROM task_lists";

impl Storage {
    pub fn task_lists(&self) -> Result<Vec<TaskList>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{} ORDER BY display_order ASC, id ASC", SELECT_LIST))?;
        let lists = stmt
            .query_map([], TaskList::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lists)
    }

    pub fn task_list(&self, id: i64) -> Result<Option<TaskList>> {
        Ok(self
            .conn()
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_LIST),
                [id],
                TaskList::from_row,
            )
            .optional()?)
    }

    /// New lists go to the end of the current order.
    pub fn create_task_list(&self, name: &str) -> Result<TaskList> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let max_order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(display_order), 0) FROM task_lists",
            [],
            |r| r.get(0),
        )?;
        tx.execute(
            "INSERT INTO task_lists (name, display_order) VALUES (?1, ?2)",
            params![name, max_order + 1],
        )?;
        let id = tx.last_insert_rowid();
        let list = tx.query_row(
            &format!("{} WHERE id = ?1", SELECT_LIST),
            [id],
            TaskList::from_row,
        )?;
        tx.commit()?;
        log::debug!("Created task list {} ({:?})", list.id, list.name);
        Ok(list)
    }

    pub fn update_task_list_content(&self, id: i64, content: &str) -> Result<Option<TaskList>> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE task_lists SET content = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![content, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_LIST),
                [id],
                TaskList::from_row,
            )
            .optional()?)
    }

    pub fn delete_task_list(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM task_lists WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Position in `ordered_ids` becomes the list's display order. Unknown
    /// ids are skipped. Applied in one transaction.
    pub fn reorder_task_lists(&self, ordered_ids: &[i64]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE task_lists SET display_order = ?1 WHERE id = ?2")?;
            for (index, id) in ordered_ids.iter().enumerate() {
                stmt.execute(params![index as i64, id])?;
            }
        }
        tx.commit().context("Failed to update task lists order")?;
        Ok(())
    }

    /// Re-parses every stored list and gathers its pinned tasks, lists in
    /// display order.
    pub fn pinned_tasks(&self) -> Result<Vec<PinnedTask>> {
        let mut pinned = Vec::new();
        for list in self.task_lists()? {
            if list.content.is_empty() {
                continue;
            }
            let tasks = parse_markdown_to_tasks(&list.content);
            pinned.extend(collect_pinned(&tasks, &list.name, list.id));
        }
        Ok(pinned)
    }

    pub fn task_list_progress(&self, id: i64) -> Result<Option<TaskProgress>> {
        Ok(self
            .task_list(id)?
            .map(|list| TaskProgress::of(&parse_markdown_to_tasks(&list.content))))
    }
}
