//! Events - Registry から購読者（UI / indicator / legacy façade）へ流れるイベント
//!
//! ペイロードの Task はスナップショット（clone）。購読者が Registry 内部を
//! 直接触ることはない。

use std::fmt;

use super::ids::SessionId;
use super::progress::ProgressMap;
use super::task::Task;
use crate::app::event_hub::HubEvent;

/// Event names, as used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskEventKind {
    ManagerInitialized,
    TaskAdded,
    TaskRemoved,
    TaskProgress,
    TaskCompleted,
    TaskFailed,
    AnimalInteraction,
    ItemCollected,
    SceneChanged,
}

impl TaskEventKind {
    pub const ALL: [TaskEventKind; 9] = [
        TaskEventKind::ManagerInitialized,
        TaskEventKind::TaskAdded,
        TaskEventKind::TaskRemoved,
        TaskEventKind::TaskProgress,
        TaskEventKind::TaskCompleted,
        TaskEventKind::TaskFailed,
        TaskEventKind::AnimalInteraction,
        TaskEventKind::ItemCollected,
        TaskEventKind::SceneChanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskEventKind::ManagerInitialized => "manager:initialized",
            TaskEventKind::TaskAdded => "task:added",
            TaskEventKind::TaskRemoved => "task:removed",
            TaskEventKind::TaskProgress => "task:progress",
            TaskEventKind::TaskCompleted => "task:completed",
            TaskEventKind::TaskFailed => "task:failed",
            TaskEventKind::AnimalInteraction => "animal:interaction",
            TaskEventKind::ItemCollected => "item:collected",
            TaskEventKind::SceneChanged => "scene:changed",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for TaskEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum TaskEvent {
    ManagerInitialized {
        session: SessionId,
    },
    TaskAdded {
        task: Task,
    },
    TaskRemoved {
        task: Task,
    },
    TaskProgress {
        task: Task,
        progress: ProgressMap,
    },
    TaskCompleted {
        task: Task,
    },
    TaskFailed {
        task: Task,
    },
    AnimalInteraction {
        animal_name: String,
        action: String,
        task: Task,
    },
    ItemCollected {
        task_id: String,
        item: String,
        amount: u32,
        location: Option<String>,
        task: Task,
    },
    SceneChanged {
        scene: String,
    },
}

impl TaskEvent {
    /// The task this event is about, if any.
    pub fn task(&self) -> Option<&Task> {
        match self {
            TaskEvent::TaskAdded { task }
            | TaskEvent::TaskRemoved { task }
            | TaskEvent::TaskProgress { task, .. }
            | TaskEvent::TaskCompleted { task }
            | TaskEvent::TaskFailed { task }
            | TaskEvent::AnimalInteraction { task, .. }
            | TaskEvent::ItemCollected { task, .. } => Some(task),
            TaskEvent::ManagerInitialized { .. } | TaskEvent::SceneChanged { .. } => None,
        }
    }
}

impl HubEvent for TaskEvent {
    type Kind = TaskEventKind;

    fn kind(&self) -> TaskEventKind {
        match self {
            TaskEvent::ManagerInitialized { .. } => TaskEventKind::ManagerInitialized,
            TaskEvent::TaskAdded { .. } => TaskEventKind::TaskAdded,
            TaskEvent::TaskRemoved { .. } => TaskEventKind::TaskRemoved,
            TaskEvent::TaskProgress { .. } => TaskEventKind::TaskProgress,
            TaskEvent::TaskCompleted { .. } => TaskEventKind::TaskCompleted,
            TaskEvent::TaskFailed { .. } => TaskEventKind::TaskFailed,
            TaskEvent::AnimalInteraction { .. } => TaskEventKind::AnimalInteraction,
            TaskEvent::ItemCollected { .. } => TaskEventKind::ItemCollected,
            TaskEvent::SceneChanged { .. } => TaskEventKind::SceneChanged,
        }
    }
}
