//! 表示用の読み取り専用プロジェクション

use serde::{Deserialize, Serialize};

use crate::domain::{Priority, Task, TaskKind, TaskStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Highest priority first.
    #[default]
    Priority,
    /// Newest first.
    CreatedAt,
    /// Most progressed first.
    Progress,
}

/// Options for `TaskRegistry::tasks_for_display`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub include_completed: bool,
    pub max_tasks: usize,
    pub sort_by: SortBy,
    pub filter_kind: Option<TaskKind>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            include_completed: false,
            max_tasks: 10,
            sort_by: SortBy::Priority,
            filter_kind: None,
        }
    }
}

impl DisplayOptions {
    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_completed(mut self) -> Self {
        self.include_completed = true;
        self
    }

    pub fn with_filter_kind(mut self, kind: impl Into<TaskKind>) -> Self {
        self.filter_kind = Some(kind.into());
        self
    }
}

/// One row of the task list UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: String,
    pub kind: TaskKind,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub progress_string: String,
    pub priority: Priority,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            kind: task.kind().clone(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            status: task.status(),
            progress: task.progress_percentage(),
            progress_string: task.progress_string(),
            priority: task.priority(),
        }
    }
}

/// Aggregate completion across active and ever-completed tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverallProgress {
    pub completed: usize,
    pub total: usize,
    pub active: usize,
    pub percentage: u8,
}

/// Monotonic registry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatistics {
    pub tasks_created: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
}
