//! Registry 設定

use serde::{Deserialize, Serialize};

/// Default retention cap for completed (and failed) history.
pub const DEFAULT_MAX_COMPLETED_TASKS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Completed tasks kept before the oldest is evicted.
    pub max_completed_tasks: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_completed_tasks: DEFAULT_MAX_COMPLETED_TASKS,
        }
    }
}

impl RegistryConfig {
    pub fn with_max_completed_tasks(mut self, cap: usize) -> Self {
        self.max_completed_tasks = cap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_completed_tasks, 100);

        let config: RegistryConfig = serde_json::from_str(r#"{"max_completed_tasks":5}"#).unwrap();
        assert_eq!(config, RegistryConfig::default().with_max_completed_tasks(5));
    }
}
