//! Presentation ports - façade が使う外部サービス
//!
//! 描画・アニメーションは core の外。ここでは「何を頼むか」だけを定義する。
//! 実装は `impls` とゲーム側。

use serde::{Deserialize, Serialize};

use crate::domain::TaskKind;

/// Screen position of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Given a task id, optionally obtain the screen position of its sprite.
pub trait SpriteLocator {
    fn sprite_position(&self, task_id: &str) -> Option<ScreenPos>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageTone {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient on-screen message.
pub trait MessageDisplay {
    fn show_message(&self, message: &str, tone: MessageTone);
}

/// Look of a task indicator above a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorStyle {
    /// 0xRRGGBB
    pub color: u32,
    pub glowing: bool,
}

pub trait IndicatorSink {
    fn create_indicator(&self, task_id: &str, at: ScreenPos, style: IndicatorStyle, kind: &TaskKind);
    fn update_indicator(&self, task_id: &str, style: IndicatorStyle);
    fn remove_indicator(&self, task_id: &str);
}
