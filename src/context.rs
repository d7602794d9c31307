// File: ./src/context.rs
/*! Application context abstraction for filesystem paths.

`AppContext` decides where the config file, the database and the log file
live. Two implementations:

- `StandardContext`: `directories::ProjectDirs`, or an override root passed
  with `--root`.
- `TestContext`: a throwaway temporary root, removed on drop.

Everything that touches the filesystem receives the context explicitly.
*/

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_FILE: &str = "paradesk.db";
pub const LOG_FILE: &str = "paradesk.log";

pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    fn get_database_path(&self, file_name: &str) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join(file_name))
    }

    fn get_log_path(&self) -> Option<PathBuf> {
        self.get_data_dir().ok().map(|p| p.join(LOG_FILE))
    }
}

fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {:?}", path))?;
    }
    Ok(path)
}

// --- Production Implementation ---

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// With `Some(root)`, data and config go to `root/data` and `root/config`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn get_proj_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "paradesk", "paradesk")
            .ok_or_else(|| anyhow::anyhow!("No home directory"))
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return ensure_exists(root.join("data"));
        }
        ensure_exists(Self::get_proj_dirs()?.data_dir().to_path_buf())
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return ensure_exists(root.join("config"));
        }
        ensure_exists(Self::get_proj_dirs()?.config_dir().to_path_buf())
    }
}

// --- Test Implementation ---

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a unique directory under the OS temp dir.
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("paradesk_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }

    /// Scratch directory for file-browser tests, outside data/config.
    pub fn workspace(&self) -> PathBuf {
        let p = self.root.join("workspace");
        let _ = std::fs::create_dir_all(&p);
        p
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("data");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("config");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub type SharedContext = std::sync::Arc<dyn AppContext>;
