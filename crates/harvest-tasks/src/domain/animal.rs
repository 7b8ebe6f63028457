//! AnimalCare - 動物の世話タスクの完了ルール
//!
//! required_actions（例: feed, talk）がすべて done になったら完了。

use super::errors::TaskError;
use super::progress::{ProgressMap, ProgressValue};

pub const DEFAULT_ACTIONS: [&str; 2] = ["feed", "talk"];

/// Animal-care body: which animal, and which actions it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalCare {
    animal_name: String,
    required_actions: Vec<String>,
}

impl AnimalCare {
    /// required_actions は順序付き・重複なし。
    pub fn new(
        task_id: &str,
        animal_name: impl Into<String>,
        required_actions: Vec<String>,
    ) -> Result<Self, TaskError> {
        if required_actions.is_empty() {
            return Err(TaskError::EmptyRequiredActions {
                id: task_id.to_string(),
            });
        }
        for (i, action) in required_actions.iter().enumerate() {
            if required_actions[..i].contains(action) {
                return Err(TaskError::DuplicateAction {
                    id: task_id.to_string(),
                    action: action.clone(),
                });
            }
        }
        Ok(Self {
            animal_name: animal_name.into(),
            required_actions,
        })
    }

    pub fn animal_name(&self) -> &str {
        &self.animal_name
    }

    pub fn required_actions(&self) -> &[String] {
        &self.required_actions
    }

    pub fn requires(&self, action: &str) -> bool {
        self.required_actions.iter().any(|a| a == action)
    }

    /// すべて false で初期化した progress
    pub fn initial_progress(&self) -> ProgressMap {
        self.required_actions
            .iter()
            .map(|a| (a.clone(), ProgressValue::Flag(false)))
            .collect()
    }

    pub fn is_done(&self, progress: &ProgressMap, action: &str) -> bool {
        progress.get(action).is_some_and(|v| v.is_done())
    }

    pub fn check_completion(&self, progress: &ProgressMap) -> bool {
        self.required_actions
            .iter()
            .all(|a| self.is_done(progress, a))
    }

    pub fn remaining_actions<'a>(&'a self, progress: &ProgressMap) -> Vec<&'a str> {
        self.required_actions
            .iter()
            .filter(|a| !self.is_done(progress, a))
            .map(String::as_str)
            .collect()
    }

    pub fn completed_actions<'a>(&'a self, progress: &ProgressMap) -> Vec<&'a str> {
        self.required_actions
            .iter()
            .filter(|a| self.is_done(progress, a))
            .map(String::as_str)
            .collect()
    }

    pub fn progress_percentage(&self, progress: &ProgressMap) -> u8 {
        let done = self.completed_actions(progress).len();
        ratio_percent(done as u64, self.required_actions.len() as u64)
    }

    pub fn progress_string(&self, progress: &ProgressMap) -> String {
        let remaining = self.remaining_actions(progress);
        if remaining.is_empty() {
            return "Completed".to_string();
        }
        format!("{}: {}", self.animal_name, remaining.join(" and "))
    }
}

/// round(100 * part / whole); 0 when whole is 0.
pub(crate) fn ratio_percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (100.0 * part as f64 / whole as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn care(actions: &[&str]) -> AnimalCare {
        AnimalCare::new(
            "cow1",
            "cow1",
            actions.iter().map(|a| a.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_actions() {
        let err = AnimalCare::new("cow1", "cow1", vec!["feed".into(), "feed".into()]).unwrap_err();
        assert_eq!(
            err,
            TaskError::DuplicateAction {
                id: "cow1".into(),
                action: "feed".into()
            }
        );
    }

    #[test]
    fn rejects_empty_actions() {
        let err = AnimalCare::new("cow1", "cow1", vec![]).unwrap_err();
        assert!(matches!(err, TaskError::EmptyRequiredActions { .. }));
    }

    #[rstest]
    #[case::none(&[], 0)]
    #[case::one_of_two(&["feed"], 50)]
    #[case::all(&["feed", "talk"], 100)]
    fn percentage_over_two_actions(#[case] done: &[&str], #[case] expected: u8) {
        let care = care(&DEFAULT_ACTIONS);
        let mut progress = care.initial_progress();
        for a in done {
            progress.insert(a.to_string(), ProgressValue::Flag(true));
        }
        assert_eq!(care.progress_percentage(&progress), expected);
    }

    #[test]
    fn thirds_are_rounded() {
        let care = care(&["feed", "talk", "pet"]);
        let mut progress = care.initial_progress();
        progress.insert("feed".into(), ProgressValue::Flag(true));
        assert_eq!(care.progress_percentage(&progress), 33);
        progress.insert("talk".into(), ProgressValue::Flag(true));
        assert_eq!(care.progress_percentage(&progress), 67);
    }

    #[test]
    fn progress_string_lists_remaining_actions() {
        let care = care(&["feed", "talk", "pet"]);
        let mut progress = care.initial_progress();
        assert_eq!(care.progress_string(&progress), "cow1: feed and talk and pet");

        progress.insert("talk".into(), ProgressValue::Flag(true));
        assert_eq!(care.progress_string(&progress), "cow1: feed and pet");

        progress.insert("feed".into(), ProgressValue::Flag(true));
        progress.insert("pet".into(), ProgressValue::Flag(true));
        assert_eq!(care.progress_string(&progress), "Completed");
    }

    #[test]
    fn unrelated_progress_keys_do_not_count() {
        let care = care(&DEFAULT_ACTIONS);
        let mut progress = care.initial_progress();
        progress.insert("dance".into(), ProgressValue::Flag(true));
        assert_eq!(care.progress_percentage(&progress), 0);
        assert!(!care.check_completion(&progress));
    }
}
