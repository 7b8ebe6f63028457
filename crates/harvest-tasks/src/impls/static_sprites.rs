//! StaticSprites - 固定のスプライト座標表（開発用・テスト用）

use std::collections::BTreeMap;

use crate::ports::{ScreenPos, SpriteLocator};

#[derive(Debug, Clone, Default)]
pub struct StaticSprites {
    positions: BTreeMap<String, ScreenPos>,
}

impl StaticSprites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, task_id: impl Into<String>, at: ScreenPos) -> Self {
        self.insert(task_id, at);
        self
    }

    pub fn insert(&mut self, task_id: impl Into<String>, at: ScreenPos) {
        self.positions.insert(task_id.into(), at);
    }
}

impl SpriteLocator for StaticSprites {
    fn sprite_position(&self, task_id: &str) -> Option<ScreenPos> {
        self.positions.get(task_id).copied()
    }
}
