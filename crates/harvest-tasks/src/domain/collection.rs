//! ItemCollection - アイテム収集タスクの完了ルール
//!
//! required_items の各アイテムが目標数に達したら完了。

use std::collections::BTreeMap;

use super::animal::ratio_percent;
use super::errors::TaskError;
use super::progress::{ProgressMap, ProgressValue};

/// Collection body: item name -> target amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCollection {
    required_items: BTreeMap<String, u32>,
}

impl ItemCollection {
    pub fn new(task_id: &str, required_items: BTreeMap<String, u32>) -> Result<Self, TaskError> {
        let required_items: BTreeMap<String, u32> = required_items
            .into_iter()
            .filter(|(_, target)| *target > 0)
            .collect();
        if required_items.is_empty() {
            return Err(TaskError::EmptyRequiredItems {
                id: task_id.to_string(),
            });
        }
        Ok(Self { required_items })
    }

    pub fn required_items(&self) -> &BTreeMap<String, u32> {
        &self.required_items
    }

    pub fn target(&self, item: &str) -> Option<u32> {
        self.required_items.get(item).copied()
    }

    pub fn initial_progress(&self) -> ProgressMap {
        self.required_items
            .keys()
            .map(|item| (item.clone(), ProgressValue::Amount(0)))
            .collect()
    }

    pub fn collected(&self, progress: &ProgressMap, item: &str) -> u32 {
        progress.get(item).map_or(0, |v| v.amount())
    }

    pub fn check_completion(&self, progress: &ProgressMap) -> bool {
        self.required_items
            .iter()
            .all(|(item, target)| self.collected(progress, item) >= *target)
    }

    pub fn progress_percentage(&self, progress: &ProgressMap) -> u8 {
        let (got, need) = self
            .required_items
            .iter()
            .fold((0u64, 0u64), |(got, need), (item, target)| {
                let have = self.collected(progress, item).min(*target);
                (got + u64::from(have), need + u64::from(*target))
            });
        ratio_percent(got, need)
    }

    pub fn progress_string(&self, progress: &ProgressMap) -> String {
        let remaining: Vec<String> = self
            .required_items
            .iter()
            .filter_map(|(item, target)| {
                let left = target.saturating_sub(self.collected(progress, item));
                (left > 0).then(|| format!("{item} x{left}"))
            })
            .collect();
        if remaining.is_empty() {
            return "Completed".to_string();
        }
        remaining.join(" and ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eggs_and_milk() -> ItemCollection {
        let mut items = BTreeMap::new();
        items.insert("egg".to_string(), 3);
        items.insert("milk".to_string(), 1);
        ItemCollection::new("basket", items).unwrap()
    }

    #[test]
    fn zero_targets_are_dropped_and_empty_is_rejected() {
        let mut items = BTreeMap::new();
        items.insert("egg".to_string(), 0);
        let err = ItemCollection::new("basket", items).unwrap_err();
        assert_eq!(err, TaskError::EmptyRequiredItems { id: "basket".into() });
    }

    #[test]
    fn percentage_caps_each_item_at_its_target() {
        let c = eggs_and_milk();
        let mut progress = c.initial_progress();
        progress.insert("egg".into(), ProgressValue::Amount(10));
        // 3 of 4 units: overshoot on eggs does not count toward milk
        assert_eq!(c.progress_percentage(&progress), 75);
        assert!(!c.check_completion(&progress));

        progress.insert("milk".into(), ProgressValue::Amount(1));
        assert_eq!(c.progress_percentage(&progress), 100);
        assert!(c.check_completion(&progress));
    }

    #[test]
    fn progress_string_lists_what_is_left() {
        let c = eggs_and_milk();
        let mut progress = c.initial_progress();
        progress.insert("egg".into(), ProgressValue::Amount(1));
        assert_eq!(c.progress_string(&progress), "egg x2 and milk x1");
    }
}
