//! Task - 追跡可能な作業単位（エンティティ）
//!
//! 完了ルールは kind ごとの body（Basic / Animal / Collection）が持つ。
//! Task 自身は状態遷移とタイムスタンプだけを管理し、Registry へのコールバックは持たない。
//! 変更系メソッドは [`ProgressReport`] を返し、Registry はそれを見てイベントを流す。

use chrono::{DateTime, Utc};
use tracing::warn;

use super::animal::{AnimalCare, DEFAULT_ACTIONS};
use super::collection::ItemCollection;
use super::config::{Priority, Rewards, TaskConfig};
use super::errors::TaskError;
use super::kind::TaskKind;
use super::progress::{ProgressMap, ProgressReport, ProgressValue};
use super::state::TaskStatus;

/// Kind-specific completion rule.
///
/// New kinds add a variant here and register a constructor in the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskBody {
    /// No built-in completion rule; completes only when forced.
    Basic,
    Animal(AnimalCare),
    Collection(ItemCollection),
}

impl TaskBody {
    fn initial_progress(&self) -> ProgressMap {
        match self {
            TaskBody::Basic => ProgressMap::new(),
            TaskBody::Animal(care) => care.initial_progress(),
            TaskBody::Collection(items) => items.initial_progress(),
        }
    }

    fn check_completion(&self, progress: &ProgressMap) -> bool {
        match self {
            TaskBody::Basic => false,
            TaskBody::Animal(care) => care.check_completion(progress),
            TaskBody::Collection(items) => items.check_completion(progress),
        }
    }

    fn progress_percentage(&self, progress: &ProgressMap) -> u8 {
        match self {
            TaskBody::Basic => 0,
            TaskBody::Animal(care) => care.progress_percentage(progress),
            TaskBody::Collection(items) => items.progress_percentage(progress),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: String,
    kind: TaskKind,
    title: String,
    description: String,
    category: Option<String>,
    priority: Priority,
    location: Option<String>,
    rewards: Rewards,
    metadata: serde_json::Map<String, serde_json::Value>,
    status: TaskStatus,
    progress: ProgressMap,
    body: TaskBody,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a task with an explicit body. `config.kind` becomes the task's kind.
    pub fn new(
        config: TaskConfig,
        body: TaskBody,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskError> {
        if config.id.trim().is_empty() {
            return Err(TaskError::MissingId);
        }
        let title = match config.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(TaskError::MissingTitle { id: config.id }),
        };
        let progress = body.initial_progress();
        Ok(Self {
            id: config.id,
            kind: config.kind,
            title,
            description: config.description.unwrap_or_default(),
            category: config.category,
            priority: config.priority,
            location: config.location,
            rewards: config.rewards,
            metadata: config.metadata,
            status: TaskStatus::Active,
            progress,
            body,
            created_at,
            completed_at: None,
        })
    }

    /// A generic task. Requires an explicit title.
    pub fn basic(config: TaskConfig, created_at: DateTime<Utc>) -> Result<Self, TaskError> {
        Self::new(config, TaskBody::Basic, created_at)
    }

    /// An animal-care task.
    ///
    /// - `animal_name` defaults to the id
    /// - `required_actions` defaults to feed + talk
    /// - a missing title/description is derived from the animal name
    pub fn animal(mut config: TaskConfig, created_at: DateTime<Utc>) -> Result<Self, TaskError> {
        if config.id.trim().is_empty() {
            return Err(TaskError::MissingId);
        }
        let animal_name = config
            .animal_name
            .clone()
            .unwrap_or_else(|| config.id.clone());
        let actions = config
            .required_actions
            .clone()
            .unwrap_or_else(|| DEFAULT_ACTIONS.iter().map(|a| a.to_string()).collect());
        let care = AnimalCare::new(&config.id, animal_name.clone(), actions)?;

        if config.title.is_none() {
            config.title = Some(format!("{animal_name} Care"));
        }
        if config.description.is_none() {
            config.description = Some(format!("Take care of {animal_name}"));
        }
        Self::new(config, TaskBody::Animal(care), created_at)
    }

    /// An item-collection task. Requires an explicit title.
    pub fn collection(config: TaskConfig, created_at: DateTime<Utc>) -> Result<Self, TaskError> {
        if config.id.trim().is_empty() {
            return Err(TaskError::MissingId);
        }
        let items = ItemCollection::new(&config.id, config.required_items.clone())?;
        Self::new(config, TaskBody::Collection(items), created_at)
    }

    // === Accessors ===

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn rewards(&self) -> Rewards {
        self.rewards
    }

    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    pub fn body(&self) -> &TaskBody {
        &self.body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn as_animal(&self) -> Option<&AnimalCare> {
        match &self.body {
            TaskBody::Animal(care) => Some(care),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&ItemCollection> {
        match &self.body {
            TaskBody::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    // === Progress ===

    pub fn check_completion(&self) -> bool {
        self.body.check_completion(&self.progress)
    }

    pub fn progress_percentage(&self) -> u8 {
        self.body.progress_percentage(&self.progress)
    }

    pub fn progress_string(&self) -> String {
        match &self.body {
            TaskBody::Basic => format!("{}%", self.progress_percentage()),
            TaskBody::Animal(care) => care.progress_string(&self.progress),
            TaskBody::Collection(items) => items.progress_string(&self.progress),
        }
    }

    /// Animal actions still to do, in required order. Empty for other kinds.
    pub fn remaining_actions(&self) -> Vec<&str> {
        self.as_animal()
            .map(|care| care.remaining_actions(&self.progress))
            .unwrap_or_default()
    }

    pub fn completed_actions(&self) -> Vec<&str> {
        self.as_animal()
            .map(|care| care.completed_actions(&self.progress))
            .unwrap_or_default()
    }

    pub fn is_action_completed(&self, action: &str) -> bool {
        self.as_animal()
            .is_some_and(|care| care.is_done(&self.progress, action))
    }

    /// Merge `data` into progress, then apply the completion rule.
    ///
    /// A failed task rejects the update. A completed task merges but never
    /// completes a second time.
    pub fn update_progress(&mut self, data: &ProgressMap, now: DateTime<Utc>) -> ProgressReport {
        if self.is_failed() {
            warn!(task_id = %self.id, "progress ignored: task has failed");
            return ProgressReport::rejected(false);
        }
        for (key, value) in data {
            self.progress.insert(key.clone(), *value);
        }
        let newly_completed = self.check_completion() && self.complete(now);
        ProgressReport {
            completed: self.is_completed(),
            newly_completed,
            applied: true,
        }
    }

    /// Mark one animal action as done.
    pub fn perform_action(&mut self, action: &str, now: DateTime<Utc>) -> ProgressReport {
        let Some(care) = self.as_animal() else {
            warn!(task_id = %self.id, kind = %self.kind, "not an animal task");
            return ProgressReport::rejected(self.is_completed());
        };
        if !self.is_active() && !self.is_completed() {
            warn!(task_id = %self.id, action, "action ignored: task has failed");
            return ProgressReport::rejected(false);
        }
        if !care.requires(action) {
            warn!(task_id = %self.id, action, "action is not required for this animal task");
            return ProgressReport::rejected(self.is_completed());
        }
        if care.is_done(&self.progress, action) {
            warn!(
                task_id = %self.id,
                action,
                "action has already been performed on {}",
                care.animal_name()
            );
            return ProgressReport::rejected(self.is_completed());
        }

        let mut data = ProgressMap::new();
        data.insert(action.to_string(), ProgressValue::Flag(true));
        self.update_progress(&data, now)
    }

    /// Add `amount` of `item` to a collection task.
    pub fn collect_item(
        &mut self,
        item: &str,
        amount: u32,
        location: Option<&str>,
        now: DateTime<Utc>,
    ) -> ProgressReport {
        let Some(items) = self.as_collection() else {
            warn!(task_id = %self.id, kind = %self.kind, "not a collection task");
            return ProgressReport::rejected(self.is_completed());
        };
        if !self.is_active() {
            warn!(task_id = %self.id, item, status = %self.status, "item ignored: task is not active");
            return ProgressReport::rejected(self.is_completed());
        }
        let Some(target) = items.target(item) else {
            warn!(task_id = %self.id, item, "item is not required for this task");
            return ProgressReport::rejected(false);
        };
        if amount == 0 {
            warn!(task_id = %self.id, item, "zero amount collected");
            return ProgressReport::rejected(false);
        }
        if let (Some(expected), Some(actual)) = (self.location.as_deref(), location)
            && expected != actual
        {
            warn!(task_id = %self.id, item, expected, actual, "item collected at the wrong location");
            return ProgressReport::rejected(false);
        }
        let have = items.collected(&self.progress, item);
        if have >= target {
            warn!(task_id = %self.id, item, "item has already been fully collected");
            return ProgressReport::rejected(false);
        }

        let mut data = ProgressMap::new();
        data.insert(item.to_string(), ProgressValue::Amount(have.saturating_add(amount)));
        self.update_progress(&data, now)
    }

    // === Transitions ===

    /// Force completion. Returns true only for the transition itself.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        match self.status {
            TaskStatus::Active => {
                self.status = TaskStatus::Completed;
                self.completed_at = Some(now);
                true
            }
            TaskStatus::Completed => false,
            TaskStatus::Failed => {
                warn!(task_id = %self.id, "cannot complete a failed task");
                false
            }
        }
    }

    /// active -> failed. Terminal states are left alone.
    pub fn fail(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Failed;
        true
    }

    /// Back to active with the kind's initial progress and no completion time.
    pub fn reset(&mut self) {
        self.status = TaskStatus::Active;
        self.progress = self.body.initial_progress();
        self.completed_at = None;
    }
}
