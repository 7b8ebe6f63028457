//! InMemoryIndicators - インジケータ表示の記録（開発用・テスト用）
//!
//! 描画はせず、今どのタスクにどの見た目のインジケータが出ているかだけを持つ。

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::TaskKind;
use crate::ports::{IndicatorSink, IndicatorStyle, ScreenPos};

#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub at: ScreenPos,
    pub style: IndicatorStyle,
    pub kind: TaskKind,
}

#[derive(Debug, Default)]
pub struct InMemoryIndicators {
    board: RefCell<BTreeMap<String, Indicator>>,
}

impl InMemoryIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: &str) -> Option<Indicator> {
        self.board.borrow().get(task_id).cloned()
    }

    /// Task ids with a visible indicator, sorted.
    pub fn task_ids(&self) -> Vec<String> {
        self.board.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.board.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.board.borrow().is_empty()
    }
}

impl IndicatorSink for InMemoryIndicators {
    fn create_indicator(&self, task_id: &str, at: ScreenPos, style: IndicatorStyle, kind: &TaskKind) {
        self.board.borrow_mut().insert(
            task_id.to_string(),
            Indicator {
                at,
                style,
                kind: kind.clone(),
            },
        );
    }

    fn update_indicator(&self, task_id: &str, style: IndicatorStyle) {
        match self.board.borrow_mut().get_mut(task_id) {
            Some(indicator) => indicator.style = style,
            None => debug!(task_id, "no indicator to update"),
        }
    }

    fn remove_indicator(&self, task_id: &str) {
        self.board.borrow_mut().remove(task_id);
    }
}
