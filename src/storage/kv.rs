// File: ./src/storage/kv.rs
use super::Storage;
use crate::config::AppTheme;
use anyhow::Result;
use rusqlite::{OptionalExtension, params};

const MIT_KEY: &str = "mit";
const THEME_KEY: &str = "theme";

fn last_path_key(mode: &str) -> String {
    format!("last_path_{}", mode)
}

impl Storage {
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let value: Option<Option<String>> = conn
            .query_row(
                "SELECT value FROM kv_storage WHERE key = ?1",
                [key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Last folder opened in a sidebar mode (`files`, `projects`, ...).
    pub fn last_path_for_mode(&self, mode: &str) -> Result<Option<String>> {
        self.get_value(&last_path_key(mode))
    }

    pub fn set_last_path_for_mode(&self, mode: &str, path: &str) -> Result<()> {
        self.set_value(&last_path_key(mode), path)
    }

    /// "Most important task" free text shown on the dashboard.
    pub fn mit(&self) -> Result<Option<String>> {
        self.get_value(MIT_KEY)
    }

    pub fn set_mit(&self, content: &str) -> Result<()> {
        self.set_value(MIT_KEY, content)
    }

    /// Stored theme; an unrecognized stored value reads as unset.
    pub fn theme(&self) -> Result<Option<AppTheme>> {
        Ok(self.get_value(THEME_KEY)?.and_then(|raw| {
            raw.parse()
                .inspect_err(|_| log::warn!("Ignoring unknown stored theme {:?}", raw))
                .ok()
        }))
    }

    pub fn set_theme(&self, theme: AppTheme) -> Result<()> {
        self.set_value(THEME_KEY, &theme.to_string())
    }
}
