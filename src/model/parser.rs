// File: ./src/model/parser.rs
use crate::model::markdown::{Node, parse_blocks};
use crate::model::task::Task;
use regex::Regex;
use std::sync::OnceLock;

pub const PIN_MARKER: &str = "[pinned]";
pub const TASK_ID_PREFIX: &str = "task-";

fn due_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[截止:([0-9]{4}-[0-9]{2}-[0-9]{2})\]").expect("due-date pattern is valid")
    })
}

/// Hands out `task-0`, `task-1`, ... for a single parse call.
#[derive(Debug, Default)]
pub struct IdGen {
    next: usize,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}{}", TASK_ID_PREFIX, self.next);
        self.next += 1;
        id
    }
}

/// Removes the first `[截止:YYYY-MM-DD]` tag from `text` and returns the date.
/// Later tags stay in the text untouched.
pub fn extract_due_date(text: &mut String) -> Option<String> {
    let caps = due_date_regex().captures(text)?;
    let whole = caps.get(0)?.range();
    let date = caps.get(1)?.as_str().to_string();
    text.replace_range(whole, "");
    Some(date)
}

/// Removes every `[pinned]` marker from `text`; true if there was at least one.
pub fn extract_pin(text: &mut String) -> bool {
    if !text.contains(PIN_MARKER) {
        return false;
    }
    *text = text.replace(PIN_MARKER, "");
    true
}

fn project_item(item: &Node, ids: &mut IdGen) -> Option<Task> {
    let Node::ListItem { checked, children } = item else {
        return None;
    };

    let mut text = children
        .iter()
        .find(|c| c.is_paragraph())
        .map(Node::flatten)
        .unwrap_or_default();

    let due_date = extract_due_date(&mut text);
    let is_pinned = extract_pin(&mut text);

    let mut task = Task {
        id: ids.next_id(),
        content: text.trim().to_string(),
        is_completed: *checked == Some(true),
        is_pinned,
        due_date,
        children: Vec::new(),
    };

    if let Some(sub_list) = children.iter().find(|c| c.is_list()) {
        task.children = project_list(sub_list, ids);
    }

    Some(task)
}

/// Projects the items of one list block, recursing into nested lists.
pub fn project_list(list: &Node, ids: &mut IdGen) -> Vec<Task> {
    list.children()
        .iter()
        .filter_map(|item| project_item(item, ids))
        .collect()
}

/// Parses a whole task-list document. Only lists sitting directly at the
/// document root contribute; everything else is ignored.
pub fn parse_markdown_to_tasks(markdown: &str) -> Vec<Task> {
    let doc = parse_blocks(markdown);
    let mut ids = IdGen::new();
    let mut tasks = Vec::new();

    for node in doc.children() {
        if node.is_list() {
            tasks.extend(project_list(node, &mut ids));
        }
    }

    log::trace!("Parsed {} top-level tasks", tasks.len());
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_due_date_first_only() {
        let mut s = "a [截止:2025-01-02] b [截止:2025-03-04]".to_string();
        assert_eq!(extract_due_date(&mut s).as_deref(), Some("2025-01-02"));
        assert_eq!(s, "a  b [截止:2025-03-04]");
    }

    #[test]
    fn test_extract_due_date_rejects_short_year() {
        let mut s = "x [截止:25-01-02]".to_string();
        assert_eq!(extract_due_date(&mut s), None);
        assert_eq!(s, "x [截止:25-01-02]");
    }

    #[test]
    fn test_extract_due_date_ascii_digits_only() {
        // Full-width digits are not accepted.
        let mut s = "x [截止:２０２５-01-02]".to_string();
        assert_eq!(extract_due_date(&mut s), None);
    }

    #[test]
    fn test_extract_pin_all_occurrences() {
        let mut s = "[pinned] x [pinned]".to_string();
        assert!(extract_pin(&mut s));
        assert_eq!(s.trim(), "x");

        let mut s = "[Pinned] x".to_string();
        assert!(!extract_pin(&mut s));
    }

    #[test]
    fn test_id_gen_sequence() {
        let mut ids = IdGen::new();
        assert_eq!(ids.next_id(), "task-0");
        assert_eq!(ids.next_id(), "task-1");
    }
}
