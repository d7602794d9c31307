// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::{AppContext, DEFAULT_DATABASE_FILE};
use crate::files::{self, BrowseOptions};
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use strum::{Display, EnumString};

fn default_database_file() -> String {
    DEFAULT_DATABASE_FILE.to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    files::DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn default_max_depth() -> usize {
    files::DEFAULT_MAX_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppTheme {
    Light,
    #[default]
    Dark,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_database_file")]
    pub database_file: String,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Used until the UI stores an explicit choice.
    #[serde(default)]
    pub default_theme: AppTheme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            allowed_extensions: default_allowed_extensions(),
            max_depth: default_max_depth(),
            log_level: default_log_level(),
            default_theme: AppTheme::default(),
        }
    }
}

impl Config {
    /// Load the configuration from disk. A missing file is an error; see
    /// `load_or_default` for the forgiving variant.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Missing file gives defaults; a broken file is still reported.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(c) => Ok(c),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::info!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        files::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            files::atomic_write(&path, toml_str)?;
            Ok(())
        })
    }

    pub fn browse_options(&self) -> BrowseOptions {
        BrowseOptions {
            allowed_extensions: self
                .allowed_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            max_depth: self.max_depth,
        }
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

/// `"MD"`, `"md"` and `".md"` all become `".md"`.
fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("max_depth = 2\n").unwrap();
        assert_eq!(cfg.max_depth, 2);
        assert_eq!(cfg.database_file, DEFAULT_DATABASE_FILE);
        assert_eq!(cfg.default_theme, AppTheme::Dark);
    }

    #[test]
    fn test_missing_file_detection() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).unwrap_err();
        assert!(Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx).unwrap().max_depth, 5);
    }

    #[test]
    fn test_extension_normalization() {
        let cfg = Config {
            allowed_extensions: vec!["MD".into(), ".txt".into()],
            ..Config::default()
        };
        assert_eq!(cfg.browse_options().allowed_extensions, vec![".md", ".txt"]);
    }

    #[test]
    fn test_theme_strings() {
        assert_eq!(AppTheme::Light.to_string(), "light");
        assert_eq!("dark".parse::<AppTheme>().unwrap(), AppTheme::Dark);
        assert!("blue".parse::<AppTheme>().is_err());
    }
}
