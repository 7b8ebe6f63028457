//! Catalog - 静的なタスクコンテンツ
//!
//! コンテンツは `tasks.json` をバイナリに埋め込んで持つ。壊れた JSON は
//! [`CatalogError::Parse`] として起動時に表に出る（ゲーム中には出ない）。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::app::TaskFactory;
use crate::domain::{CatalogError, Priority, Task, TaskConfig, TaskKind};

const BUILTIN_CATALOG: &str = include_str!("tasks.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub enable_notifications: bool,
    pub enable_sounds: bool,
    pub max_active_tasks_per_type: usize,
    pub enable_task_priorities: bool,
    pub enable_task_categories: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    /// 0xRRGGBB
    pub color: u32,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityInfo {
    pub value: i32,
    pub name: String,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTypeInfo {
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCatalog {
    pub version: String,
    pub settings: CatalogSettings,
    pub categories: BTreeMap<String, CategoryInfo>,
    pub priorities: BTreeMap<String, PriorityInfo>,
    pub reward_types: BTreeMap<String, RewardTypeInfo>,
    starter_tasks: Vec<String>,
    tasks: Vec<TaskConfig>,
}

impl TaskCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every animal-care record, in catalog order.
    pub fn animal_task_configs(&self) -> Vec<&TaskConfig> {
        self.tasks
            .iter()
            .filter(|config| config.kind.as_str() == TaskKind::ANIMAL)
            .collect()
    }

    pub fn task_config(&self, id: &str) -> Option<&TaskConfig> {
        self.tasks.iter().find(|config| config.id == id)
    }

    pub fn tasks_by_category(&self, category: &str) -> Vec<&TaskConfig> {
        self.tasks
            .iter()
            .filter(|config| config.category.as_deref() == Some(category))
            .collect()
    }

    pub fn tasks_by_priority(&self, priority: impl Into<Priority>) -> Vec<&TaskConfig> {
        let priority = priority.into();
        self.tasks
            .iter()
            .filter(|config| config.priority == priority)
            .collect()
    }

    /// Ids a new player starts with.
    pub fn starter_task_ids(&self) -> Vec<&str> {
        self.starter_tasks.iter().map(String::as_str).collect()
    }

    /// Build the tasks for `ids` in order.
    ///
    /// Unknown ids and records that fail to build are logged and skipped.
    pub fn create_tasks(&self, ids: &[&str], factory: &TaskFactory) -> Vec<Task> {
        let mut tasks = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(config) = self.task_config(id) else {
                warn!(task_id = id, "task configuration not found");
                continue;
            };
            match factory.create_task(&config.kind, id, config.clone()) {
                Ok(task) => tasks.push(task),
                Err(err) => error!(task_id = id, error = %err, "failed to create task"),
            }
        }
        tasks
    }

    /// Lookup that reports a missing id as an error.
    pub fn require_task_config(&self, id: &str) -> Result<&TaskConfig, CatalogError> {
        self.task_config(id)
            .ok_or_else(|| CatalogError::UnknownTask(id.to_string()))
    }

    /// A record is complete when it has a title, a description and a category.
    pub fn validate_task_config(config: &TaskConfig) -> bool {
        [&config.title, &config.description, &config.category]
            .iter()
            .all(|field| field.as_deref().is_some_and(|s| !s.is_empty()))
    }

    pub fn category_info(&self, category: &str) -> Option<&CategoryInfo> {
        self.categories.get(category)
    }

    pub fn priority_info(&self, name: &str) -> Option<&PriorityInfo> {
        self.priorities.get(name)
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }
}
