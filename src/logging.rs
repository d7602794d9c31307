// File: ./src/logging.rs
// Logger setup: terminal output on stderr plus a persistent log file.
use crate::context::AppContext;
use anyhow::Result;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::OpenOptions;

/// stdout carries bridge traffic, so the terminal logger writes to stderr.
/// The file logger keeps debug detail regardless of the terminal level.
pub fn init(ctx: &dyn AppContext, level: LevelFilter) -> Result<()> {
    let config = ConfigBuilder::new()
        .add_filter_allow_str("paradesk")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = ctx.get_log_path() {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => loggers.push(WriteLogger::new(level.max(LevelFilter::Debug), config, file)),
            Err(e) => eprintln!("Could not open log file {}: {}", path.display(), e),
        }
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
