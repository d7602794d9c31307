// File: ./src/bridge.rs
//! Request/response bridge between the UI process and the backend.
//!
//! Each request names a channel and carries positional JSON arguments:
//!
//! ```text
//! -> {"id": 7, "channel": "parse-markdown-tasks", "args": [{"content": "- [ ] a"}]}
//! <- {"id": 7, "result": [{"id": "task-0", "content": "a", ...}]}
//! ```
//!
//! `serve` speaks this as JSON lines over any async reader/writer pair; the
//! binary wires it to stdin/stdout.
use crate::config::{AppTheme, Config};
use crate::context::AppContext;
use crate::files::{self, BrowseOptions};
use crate::model::{TaskProgress, parse_markdown_to_tasks};
use crate::storage::{CalendarEventUpdate, NewCalendarEvent, Storage};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    pub channel: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: String) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }
}

fn arg<T: DeserializeOwned>(args: &[Value], idx: usize, name: &str) -> Result<T> {
    let raw = args
        .get(idx)
        .ok_or_else(|| anyhow!("Missing argument #{} ({})", idx, name))?;
    serde_json::from_value(raw.clone()).with_context(|| format!("Invalid argument '{}'", name))
}

fn opt_arg<T: DeserializeOwned>(args: &[Value], idx: usize, name: &str) -> Result<Option<T>> {
    match args.get(idx) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => arg(args, idx, name).map(Some),
    }
}

/// Accepts `{"content": "..."}` as well as a bare string.
fn markdown_arg(args: &[Value]) -> Result<String> {
    match args.first() {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Object(map)) => match map.get("content") {
            Some(Value::String(s)) => Ok(s.clone()),
            None | Some(Value::Null) => Ok(String::new()),
            Some(_) => bail!("Invalid argument 'content': expected a string"),
        },
        None | Some(Value::Null) => Ok(String::new()),
        Some(_) => bail!("Invalid argument 'content': expected a string or {{content}}"),
    }
}

#[derive(Deserialize)]
struct ModePath {
    mode: String,
    path: String,
}

#[derive(Deserialize)]
struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// File-browser failures reach the UI as a soft `null`/`false`, matching
/// what it renders for "nothing there".
fn soft<T: Serialize>(what: &str, res: Result<T>, fallback: Value) -> Result<Value> {
    match res {
        Ok(v) => Ok(serde_json::to_value(v)?),
        Err(e) => {
            log::error!("{} failed: {:#}", what, e);
            Ok(fallback)
        }
    }
}

pub struct Bridge {
    storage: Storage,
    config: Config,
    browse: BrowseOptions,
}

impl Bridge {
    pub fn new(storage: Storage, config: Config) -> Self {
        let browse = config.browse_options();
        Self {
            storage,
            config,
            browse,
        }
    }

    /// Opens the configured database under the context's data directory.
    pub fn open(ctx: &dyn AppContext, config: Config) -> Result<Self> {
        let db_path = ctx.get_database_path(&config.database_file)?;
        let storage = Storage::open(&db_path)?;
        Ok(Self::new(storage, config))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn handle(&self, req: Request) -> Response {
        log::debug!("-> {}", req.channel);
        match self.dispatch(&req.channel, &req.args) {
            Ok(result) => Response::success(req.id, result),
            Err(e) => {
                log::warn!("Channel '{}' failed: {:#}", req.channel, e);
                Response::failure(req.id, format!("{:#}", e))
            }
        }
    }

    pub fn dispatch(&self, channel: &str, args: &[Value]) -> Result<Value> {
        let db = &self.storage;
        let value = match channel {
            // --- Markdown tasks ---
            "parse-markdown-tasks" => json!(parse_markdown_to_tasks(&markdown_arg(args)?)),
            "get-pinned-tasks" => {
                let tasks = db.pinned_tasks()?;
                let progress = TaskProgress::of_pinned(&tasks);
                json!({ "tasks": tasks, "total": progress.total, "completed": progress.completed })
            }
            "get-task-list-progress" => json!(db.task_list_progress(arg(args, 0, "id")?)?),

            // --- Key-value ---
            "get-theme" => json!(db.theme()?.unwrap_or(self.config.default_theme)),
            "set-theme" => {
                let raw: String = arg(args, 0, "theme")?;
                let theme: AppTheme = raw
                    .parse()
                    .map_err(|_| anyhow!("Unknown theme {:?}", raw))?;
                db.set_theme(theme)?;
                Value::Null
            }
            "get-mit" => json!(db.mit()?),
            "set-mit" => {
                db.set_mit(&arg::<String>(args, 0, "content")?)?;
                Value::Null
            }
            "get-last-path-for-mode" => json!(db.last_path_for_mode(&arg::<String>(args, 0, "mode")?)?),
            "set-last-path-for-mode" => {
                let mp: ModePath = arg(args, 0, "{mode, path}")?;
                db.set_last_path_for_mode(&mp.mode, &mp.path)?;
                Value::Null
            }

            // --- Scratchpad ---
            "get-scratchpad-notes" => json!(db.scratchpad_notes()?),
            "add-scratchpad-note" => json!(db.add_scratchpad_note(&arg::<String>(args, 0, "content")?)?),
            "update-scratchpad-note" => json!(db.update_scratchpad_note(
                arg(args, 0, "id")?,
                &arg::<String>(args, 1, "content")?
            )?),
            "delete-scratchpad-note" => json!(db.delete_scratchpad_note(arg(args, 0, "id")?)?),

            // --- Task lists ---
            "get-task-lists" => json!(db.task_lists()?),
            "get-task-list" => json!(db.task_list(arg(args, 0, "id")?)?),
            "create-task-list" => json!(db.create_task_list(&arg::<String>(args, 0, "name")?)?),
            "update-task-list-content" => json!(db.update_task_list_content(
                arg(args, 0, "id")?,
                &arg::<String>(args, 1, "content")?
            )?),
            "delete-task-list" => json!(db.delete_task_list(arg(args, 0, "id")?)?),
            "update-task-lists-order" => {
                let ids: Vec<i64> = arg(args, 0, "orderedIds")?;
                match db.reorder_task_lists(&ids) {
                    Ok(()) => json!(true),
                    Err(e) => {
                        log::error!("Failed to update task lists order: {:#}", e);
                        json!(false)
                    }
                }
            }

            // --- Calendar ---
            "get-calendar-events" => {
                let range: DateRange = arg(args, 0, "{start, end}")?;
                json!(db.calendar_events_between(range.start, range.end)?)
            }
            "create-calendar-event" => {
                json!(db.create_calendar_event(&arg::<NewCalendarEvent>(args, 0, "event")?)?)
            }
            "update-calendar-event" => json!(db.update_calendar_event(
                arg(args, 0, "id")?,
                &arg::<CalendarEventUpdate>(args, 1, "update")?
            )?),
            "delete-calendar-event" => json!(db.delete_calendar_event(arg(args, 0, "id")?)?),
            "get-pinned-calendar-events" => json!(db.pinned_calendar_events()?),

            // --- File browser ---
            "get-files" => match opt_arg::<PathBuf>(args, 0, "directoryPath")? {
                Some(dir) => soft(
                    "Reading directory",
                    files::open_folder(&dir, &self.browse),
                    Value::Null,
                )?,
                None => Value::Null,
            },
            "read-file" => {
                let path: PathBuf = arg(args, 0, "filePath")?;
                soft("Reading file", files::read_file(&path), Value::Null)?
            }
            "save-file" => {
                let path: PathBuf = arg(args, 0, "filePath")?;
                let content: String = arg(args, 1, "content")?;
                soft("Saving file", files::save_file(&path, &content).map(|_| true), json!(false))?
            }
            "create-file" | "create-folder" => {
                let parent: PathBuf = arg(args, 0, "parentDir")?;
                let name: String = arg(args, 1, "name")?;
                let root: PathBuf = arg(args, 2, "rootPath")?;
                let res = if channel == "create-file" {
                    files::create_file(&parent, &name, &root, &self.browse)
                } else {
                    files::create_folder(&parent, &name, &root, &self.browse)
                };
                soft("Creating entry", res, Value::Null)?
            }
            "delete-entry" => {
                let path: PathBuf = arg(args, 0, "entryPath")?;
                soft("Deleting entry", files::delete_entry(&path).map(|_| true), json!(false))?
            }
            "rename-entry" => {
                let old: PathBuf = arg(args, 0, "oldPath")?;
                let new_name: String = arg(args, 1, "newName")?;
                soft("Renaming entry", files::rename_entry(&old, &new_name), Value::Null)?
            }

            other => bail!("Unknown channel '{}'", other),
        };
        Ok(value)
    }
}

/// Serves JSON-line requests until the reader hits EOF. Requests are answered
/// one at a time, in order; each runs on the blocking pool.
pub async fn serve<R, W>(bridge: Arc<Bridge>, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(req) => {
                let bridge = bridge.clone();
                tokio::task::spawn_blocking(move || bridge.handle(req)).await?
            }
            Err(e) => Response::failure(Value::Null, format!("Malformed request: {}", e)),
        };
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    log::info!("Bridge input closed, shutting down");
    Ok(())
}

pub async fn serve_stdio(bridge: Arc<Bridge>) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(bridge, stdin, tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_arg_shapes() {
        assert_eq!(markdown_arg(&[json!("- a")]).unwrap(), "- a");
        assert_eq!(markdown_arg(&[json!({"content": "- b"})]).unwrap(), "- b");
        assert_eq!(markdown_arg(&[]).unwrap(), "");
        assert!(markdown_arg(&[json!(3)]).is_err());
    }

    #[test]
    fn test_opt_arg_null_is_none() {
        let v: Option<String> = opt_arg(&[Value::Null], 0, "x").unwrap();
        assert!(v.is_none());
        let v: Option<String> = opt_arg(&[], 0, "x").unwrap();
        assert!(v.is_none());
    }
}
