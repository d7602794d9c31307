// File: ./src/model/mod.rs
pub mod markdown;
pub mod parser;
pub mod task;

pub use parser::parse_markdown_to_tasks;
pub use task::{PinnedTask, Task, TaskProgress, collect_pinned, walk};
