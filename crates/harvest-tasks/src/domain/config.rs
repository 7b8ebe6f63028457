//! Declarative task records (what the catalog and callers hand to the factory).
//!
//! Fields are optional wherever a kind can supply a sensible default, so the
//! same record shape serves every kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::kind::TaskKind;

/// A declarative task description: `{kind, id, title, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default, alias = "type")]
    pub kind: TaskKind,

    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    /// Animal-care only. Defaults to the task id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Animal-care only. Defaults to `["feed", "talk"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,

    /// Collection only: item name -> amount needed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_items: BTreeMap<String, u32>,

    #[serde(default)]
    pub rewards: Rewards,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl TaskConfig {
    pub fn new(kind: impl Into<TaskKind>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_animal_name(mut self, name: impl Into<String>) -> Self {
        self.animal_name = Some(name.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_required_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_required_item(mut self, item: impl Into<String>, amount: u32) -> Self {
        self.required_items.insert(item.into(), amount);
        self
    }

    pub fn with_rewards(mut self, rewards: Rewards) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Display priority. Higher sorts first.
///
/// Accepts either a raw integer or a level name (`"low"` .. `"critical"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "PriorityRepr", into = "i32")]
pub struct Priority(i32);

impl Priority {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl From<PriorityLevel> for Priority {
    fn from(level: PriorityLevel) -> Self {
        Self(level.value())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Value(i32),
    Level(PriorityLevel),
}

impl From<PriorityRepr> for Priority {
    fn from(repr: PriorityRepr) -> Self {
        match repr {
            PriorityRepr::Value(v) => Priority(v),
            PriorityRepr::Level(level) => level.into(),
        }
    }
}

/// Named priority levels used by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    Normal,
    High,
    Urgent,
    Critical,
}

impl PriorityLevel {
    pub fn value(self) -> i32 {
        match self {
            PriorityLevel::Low => 1,
            PriorityLevel::Normal => 2,
            PriorityLevel::High => 3,
            PriorityLevel::Urgent => 4,
            PriorityLevel::Critical => 5,
        }
    }
}

/// Reward metadata granted on completion. The core only carries it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub gold: u32,
    pub experience: u32,
    pub reputation: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::number("7", 7)]
    #[case::low("\"low\"", 1)]
    #[case::normal("\"normal\"", 2)]
    #[case::high("\"high\"", 3)]
    #[case::critical("\"critical\"", 5)]
    fn priority_accepts_numbers_and_levels(#[case] json: &str, #[case] expected: i32) {
        let p: Priority = serde_json::from_str(json).unwrap();
        assert_eq!(p.value(), expected);
    }

    #[test]
    fn priority_serializes_as_integer() {
        let s = serde_json::to_string(&Priority::from(PriorityLevel::Urgent)).unwrap();
        assert_eq!(s, "4");
    }

    #[test]
    fn config_without_optional_fields_gets_defaults() {
        let json = r#"{ "type": "animal", "id": "cow1" }"#;
        let config: TaskConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.kind, TaskKind::animal());
        assert_eq!(config.id, "cow1");
        assert_eq!(config.priority, Priority::default());
        assert_eq!(config.rewards, Rewards::default());
        assert!(config.required_actions.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let config = TaskConfig::new("animal", "chicken1")
            .with_title("Care for Chicken #1")
            .with_priority(PriorityLevel::High)
            .with_required_actions(["feed", "talk"])
            .with_metadata("difficulty", serde_json::json!("easy"));

        assert_eq!(config.title.as_deref(), Some("Care for Chicken #1"));
        assert_eq!(config.priority.value(), 3);
        assert_eq!(
            config.required_actions,
            Some(vec!["feed".to_string(), "talk".to_string()])
        );
        assert_eq!(config.metadata["difficulty"], "easy");
    }
}
