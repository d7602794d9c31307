// File: ./src/model/task.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One checklist item projected out of a Markdown task list.
///
/// Ids are only meaningful within the parse call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub content: String,
    pub is_completed: bool,
    pub is_pinned: bool,
    pub due_date: Option<String>,
    #[serde(default)]
    pub children: Vec<Task>,
}

impl Task {
    /// Due date as a calendar date. `None` when absent or not a real date
    /// (the tag syntax accepts e.g. `2025-02-30`).
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// Open and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.due_date().is_some_and(|d| d < today)
    }

    /// Pre-order walk over this task and all of its descendants.
    pub fn iter(&self) -> TaskIter<'_> {
        TaskIter { stack: vec![self] }
    }
}

pub struct TaskIter<'a> {
    stack: Vec<&'a Task>,
}

impl<'a> Iterator for TaskIter<'a> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<Self::Item> {
        let task = self.stack.pop()?;
        self.stack.extend(task.children.iter().rev());
        Some(task)
    }
}

/// Pre-order walk over a whole forest, in document order.
pub fn walk(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    tasks.iter().flat_map(Task::iter)
}

/// A pinned task surfaced in the cross-list view, tagged with where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedTask {
    #[serde(flatten)]
    pub task: Task,
    pub source_list: String,
    pub source_list_id: i64,
}

/// Collects every pinned task of a forest, at any depth. A pinned parent
/// keeps its children in the copy, and pinned children are reported again
/// on their own.
pub fn collect_pinned(tasks: &[Task], source_list: &str, source_list_id: i64) -> Vec<PinnedTask> {
    walk(tasks)
        .filter(|t| t.is_pinned)
        .map(|t| PinnedTask {
            task: t.clone(),
            source_list: source_list.to_string(),
            source_list_id,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub total: usize,
    pub completed: usize,
}

impl TaskProgress {
    pub fn of(tasks: &[Task]) -> Self {
        walk(tasks).fold(Self::default(), |mut acc, t| {
            acc.total += 1;
            if t.is_completed {
                acc.completed += 1;
            }
            acc
        })
    }

    pub fn of_pinned(tasks: &[PinnedTask]) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks.iter().filter(|p| p.task.is_completed).count(),
        }
    }

    /// Completion ratio in `0.0..=1.0`; an empty list counts as done.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
