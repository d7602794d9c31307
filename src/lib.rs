// Crate root library declaration and module exports.
pub mod bridge;
pub mod cli;
pub mod config;
pub mod context;
pub mod files;
pub mod logging;
pub mod model;
pub mod storage;
