//! SessionContext - セッション単位の UI/シーン状態
//!
//! プロセス全体の共有設定の代わりに、セッション開始時に 1 つ作って
//! TaskSystem が所有する。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionContext {
    current_scene: Option<String>,
    previous_scene: Option<String>,
    task_menu_open: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_scene(&self) -> Option<&str> {
        self.current_scene.as_deref()
    }

    pub fn previous_scene(&self) -> Option<&str> {
        self.previous_scene.as_deref()
    }

    /// The current scene becomes the previous one.
    pub fn enter_scene(&mut self, scene: impl Into<String>) {
        self.previous_scene = self.current_scene.take();
        self.current_scene = Some(scene.into());
    }

    pub fn is_task_menu_open(&self) -> bool {
        self.task_menu_open
    }

    pub fn set_task_menu_open(&mut self, open: bool) {
        self.task_menu_open = open;
    }

    /// Returns the new state.
    pub fn toggle_task_menu(&mut self) -> bool {
        self.task_menu_open = !self.task_menu_open;
        self.task_menu_open
    }
}
