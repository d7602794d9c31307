// File: ./src/storage/calendar.rs
use super::Storage;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    /// Shown in the dashboard's "most urgent" slot.
    pub is_urgent_pin: bool,
    /// Shown in the dashboard's "future reminders" slot.
    pub is_future_reminder_pin: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl CalendarEvent {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            title: row.get("title")?,
            content: row.get("content")?,
            is_urgent_pin: row.get("is_urgent_pin")?,
            is_future_reminder_pin: row.get("is_future_reminder_pin")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCalendarEvent {
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_urgent_pin: bool,
    #[serde(default)]
    pub is_future_reminder_pin: bool,
}

/// Partial update: `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarEventUpdate {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_urgent_pin: Option<bool>,
    pub is_future_reminder_pin: Option<bool>,
}

const SELECT_EVENT: &str = "SELECT id, date, title, content, is_urgent_pin, is_future_reminder_pin, created_at, updated_at FROM calendar_events";

fn fetch_event(conn: &Connection, id: i64) -> Result<Option<CalendarEvent>> {
    Ok(conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_EVENT),
            [id],
            CalendarEvent::from_row,
        )
        .optional()?)
}

impl Storage {
    /// Events dated within `start..=end`, by date then creation.
    pub fn calendar_events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, id ASC",
            SELECT_EVENT
        ))?;
        let events = stmt
            .query_map(params![start, end], CalendarEvent::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    pub fn calendar_event(&self, id: i64) -> Result<Option<CalendarEvent>> {
        fetch_event(&self.conn(), id)
    }

    pub fn create_calendar_event(&self, event: &NewCalendarEvent) -> Result<CalendarEvent> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO calendar_events (date, title, content, is_urgent_pin, is_future_reminder_pin)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    event.date,
                    event.title,
                    event.content,
                    event.is_urgent_pin,
                    event.is_future_reminder_pin
                ],
            )?;
            conn.last_insert_rowid()
        };
        self.calendar_event(id)?
            .ok_or_else(|| anyhow::anyhow!("Calendar event {} vanished after insert", id))
    }

    pub fn update_calendar_event(
        &self,
        id: i64,
        update: &CalendarEventUpdate,
    ) -> Result<Option<CalendarEvent>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let Some(current) = fetch_event(&tx, id)? else {
            return Ok(None);
        };
        tx.execute(
            "UPDATE calendar_events
             SET date = ?1, title = ?2, content = ?3, is_urgent_pin = ?4,
                 is_future_reminder_pin = ?5, updated_at = datetime('now')
             WHERE id = ?6",
            params![
                update.date.unwrap_or(current.date),
                update.title.as_deref().unwrap_or(&current.title),
                update.content.as_deref().unwrap_or(&current.content),
                update.is_urgent_pin.unwrap_or(current.is_urgent_pin),
                update
                    .is_future_reminder_pin
                    .unwrap_or(current.is_future_reminder_pin),
                id
            ],
        )?;
        let updated = fetch_event(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    pub fn delete_calendar_event(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM calendar_events WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Events carrying either dashboard pin.
    pub fn pinned_calendar_events(&self) -> Result<Vec<CalendarEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE is_urgent_pin = 1 OR is_future_reminder_pin = 1 ORDER BY date ASC, id ASC",
            SELECT_EVENT
        ))?;
        let events = stmt
            .query_map([], CalendarEvent::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }
}
