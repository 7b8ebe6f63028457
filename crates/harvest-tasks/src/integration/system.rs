//! TaskSystem - 旧来の呼び出し形を保ったまま Registry を使う façade
//!
//! # 責務
//! - Catalog から starter タスクを読み込む
//! - Registry のイベントをインジケータ表示につなぐ
//! - 旧 API（`handle_animal_task` や `animal_tasks` など）の形で結果を返す
//!
//! 描画・アニメーションは presentation ports の向こう側。

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::{
    DisplayOptions, ListenerResult, NewTask, OverallProgress, RegistryConfig, TaskRegistry,
    TaskView,
};
use crate::catalog::TaskCatalog;
use crate::domain::{CatalogError, Task, TaskError, TaskEvent, TaskEventKind, TaskKind};
use crate::integration::context::SessionContext;
use crate::ports::{
    Clock, IndicatorSink, IndicatorStyle, MessageDisplay, MessageTone, ScreenPos, SpriteLocator,
};

const INDICATOR_YELLOW: u32 = 0xffff00;
const INDICATOR_ORANGE: u32 = 0xffa500;
const INDICATOR_GOLD: u32 = 0xffd700;
/// Indicators float this far above the sprite.
const INDICATOR_OFFSET_Y: f32 = 20.0;
const LEGACY_LIST_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSystemConfig {
    pub max_completed_tasks: usize,
    /// Load the catalog's starter set on construction.
    pub load_starter_tasks: bool,
}

impl Default for TaskSystemConfig {
    fn default() -> Self {
        Self {
            max_completed_tasks: 50,
            load_starter_tasks: true,
        }
    }
}

/// The services the façade draws with.
#[derive(Clone)]
pub struct PresentationServices {
    pub sprites: Rc<dyn SpriteLocator>,
    pub messages: Rc<dyn MessageDisplay>,
    pub indicators: Rc<dyn IndicatorSink>,
}

/// `{completed, total, percentage}` without the active count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompatibleProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// One line of the old task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibleTask {
    pub id: String,
    pub instruction: String,
    pub kind: TaskKind,
}

/// Feed/talk flags of one animal task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnimalFlags {
    pub feed: bool,
    pub talk: bool,
}

/// Indicator colour for a task at `percent` progress.
pub fn indicator_color(percent: u8) -> u32 {
    match percent {
        75.. => INDICATOR_GOLD,
        50.. => INDICATOR_ORANGE,
        _ => INDICATOR_YELLOW,
    }
}

pub struct TaskSystem {
    registry: TaskRegistry,
    catalog: TaskCatalog,
    context: SessionContext,
    services: PresentationServices,
}

impl TaskSystem {
    /// Build the registry, wire the indicator listeners and load the starter set.
    pub fn new(
        config: TaskSystemConfig,
        clock: Rc<dyn Clock>,
        services: PresentationServices,
    ) -> Result<Self, CatalogError> {
        let catalog = TaskCatalog::builtin()?;
        let registry_config =
            RegistryConfig::default().with_max_completed_tasks(config.max_completed_tasks);
        let mut system = Self {
            registry: TaskRegistry::new(registry_config, clock),
            catalog,
            context: SessionContext::new(),
            services,
        };
        system.wire_indicators();
        system.registry.initialize();
        if config.load_starter_tasks {
            system.load_default_tasks();
        }
        Ok(system)
    }

    fn wire_indicators(&self) {
        let events = self.registry.events();

        let sprites = Rc::clone(&self.services.sprites);
        let indicators = Rc::clone(&self.services.indicators);
        events.on(TaskEventKind::TaskAdded, move |event: &TaskEvent| -> ListenerResult {
            let Some(task) = event.task() else {
                return Ok(());
            };
            // スプライトがないタスクにはインジケータを出さない
            if let Some(pos) = sprites.sprite_position(task.id()) {
                let at = ScreenPos::new(pos.x, pos.y - INDICATOR_OFFSET_Y);
                let style = IndicatorStyle {
                    color: indicator_color(task.progress_percentage()),
                    glowing: task.is_active(),
                };
                indicators.create_indicator(task.id(), at, style, task.kind());
            }
            Ok(())
        });

        let indicators = Rc::clone(&self.services.indicators);
        events.on(TaskEventKind::TaskProgress, move |event: &TaskEvent| -> ListenerResult {
            if let Some(task) = event.task() {
                let style = if task.is_completed() {
                    IndicatorStyle {
                        color: INDICATOR_GOLD,
                        glowing: false,
                    }
                } else {
                    IndicatorStyle {
                        color: indicator_color(task.progress_percentage()),
                        glowing: true,
                    }
                };
                indicators.update_indicator(task.id(), style);
            }
            Ok(())
        });

        for kind in [
            TaskEventKind::TaskCompleted,
            TaskEventKind::TaskRemoved,
            TaskEventKind::TaskFailed,
        ] {
            let indicators = Rc::clone(&self.services.indicators);
            events.on(kind, move |event: &TaskEvent| -> ListenerResult {
                if let Some(task) = event.task() {
                    indicators.remove_indicator(task.id());
                }
                Ok(())
            });
        }
    }

    /// Admit the catalog's starter set unless tasks are already active.
    /// Returns how many were added.
    pub fn load_default_tasks(&mut self) -> usize {
        if !self.registry.active_tasks().is_empty() {
            return 0;
        }
        let ids = self.catalog.starter_task_ids();
        let tasks = self.catalog.create_tasks(&ids, self.registry.factory());
        let mut loaded = 0;
        for task in tasks {
            match self.registry.add_task(task) {
                Ok(_) => loaded += 1,
                Err(err) => warn!(error = %err, "starter task rejected"),
            }
        }
        info!(loaded, "loaded starter tasks");
        loaded
    }

    pub fn add_task(&mut self, task: impl Into<NewTask>) -> Result<&Task, TaskError> {
        self.registry.add_task(task)
    }

    // === Legacy proxy ===

    /// Perform the next remaining action on an animal task.
    pub fn handle_animal_task(&mut self, animal_name: &str) -> bool {
        let next = self
            .active_animal(animal_name)
            .and_then(|task| task.remaining_actions().first().map(|a| a.to_string()));
        match next {
            Some(action) => self.registry.handle_animal_interaction(animal_name, &action),
            None => false,
        }
    }

    /// Interact with an animal and tell the player about it.
    ///
    /// Without `action` the next remaining action is used, or `talk`.
    pub fn handle_animal_interaction(&mut self, animal_name: &str, action: Option<&str>) -> bool {
        let Some(task) = self.active_animal(animal_name) else {
            warn!(task_id = animal_name, "animal task not found");
            return false;
        };
        let action = match action {
            Some(action) => action.to_string(),
            None => task
                .remaining_actions()
                .first()
                .map_or_else(|| "talk".to_string(), |a| a.to_string()),
        };

        let completed = self.registry.handle_animal_interaction(animal_name, &action);
        self.services
            .messages
            .show_message(&format!("You {action} {animal_name}!"), MessageTone::Success);
        if completed {
            self.services.indicators.remove_indicator(animal_name);
            self.services.messages.show_message(
                &format!("{animal_name} is happy for today!"),
                MessageTone::Success,
            );
        }
        completed
    }

    pub fn progress(&self) -> OverallProgress {
        self.registry.overall_progress()
    }

    pub fn compatible_progress(&self) -> CompatibleProgress {
        let progress = self.registry.overall_progress();
        CompatibleProgress {
            completed: progress.completed,
            total: progress.total,
            percentage: progress.percentage,
        }
    }

    pub fn active_tasks(&self) -> Vec<TaskView> {
        self.registry
            .tasks_for_display(&DisplayOptions::default().with_max_tasks(LEGACY_LIST_LIMIT))
    }

    pub fn compatible_active_tasks(&self) -> Vec<CompatibleTask> {
        self.active_tasks()
            .into_iter()
            .map(|view| CompatibleTask {
                instruction: if view.progress_string.is_empty() {
                    view.title
                } else {
                    view.progress_string
                },
                id: view.id,
                kind: view.kind,
            })
            .collect()
    }

    /// Active animal tasks keyed by id.
    pub fn animal_tasks(&self) -> BTreeMap<String, AnimalFlags> {
        self.registry
            .tasks_by_kind(&TaskKind::animal())
            .into_iter()
            .map(|task| {
                let flags = AnimalFlags {
                    feed: task.is_action_completed("feed"),
                    talk: task.is_action_completed("talk"),
                };
                (task.id().to_string(), flags)
            })
            .collect()
    }

    /// True once no animal task is still pending.
    pub fn are_all_animals_complete(&self) -> bool {
        self.registry
            .tasks_by_kind(&TaskKind::animal())
            .iter()
            .all(|task| task.is_completed())
    }

    pub fn has_active_tasks_for_target(&self, id: &str) -> bool {
        self.registry.has_active_tasks_for_target(id)
    }

    pub fn show_message(&self, message: &str) {
        self.services.messages.show_message(message, MessageTone::Info);
    }

    pub fn remove_indicator(&self, task_id: &str) {
        self.services.indicators.remove_indicator(task_id);
    }

    pub fn update_scene(&mut self, scene: &str) {
        self.context.enter_scene(scene);
        self.registry.update_scene(scene);
    }

    /// Returns whether the menu is now open.
    pub fn toggle_task_menu(&mut self) -> bool {
        self.context.toggle_task_menu()
    }

    // === Accessors ===

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TaskRegistry {
        &mut self.registry
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Remove every indicator and tear down the registry.
    pub fn destroy(self) {
        for task in self.registry.active_tasks() {
            self.services.indicators.remove_indicator(task.id());
        }
        self.registry.destroy();
    }

    fn active_animal(&self, animal_name: &str) -> Option<&Task> {
        self.registry
            .get_task(animal_name)
            .filter(|task| task.is_active() && task.as_animal().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryIndicators, RecordingMessages, StaticSprites};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    struct Harness {
        system: TaskSystem,
        messages: Rc<RecordingMessages>,
        indicators: Rc<InMemoryIndicators>,
    }

    fn harness(load_starter_tasks: bool) -> Harness {
        let clock = Rc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap(),
        ));
        let sprites = StaticSprites::new()
            .with("cow1", ScreenPos::new(100.0, 200.0))
            .with("chicken1", ScreenPos::new(300.0, 220.0));
        let messages = Rc::new(RecordingMessages::new());
        let indicators = Rc::new(InMemoryIndicators::new());
        let services = PresentationServices {
            sprites: Rc::new(sprites),
            messages: messages.clone(),
            indicators: indicators.clone(),
        };
        let config = TaskSystemConfig {
            load_starter_tasks,
            ..TaskSystemConfig::default()
        };
        let system = TaskSystem::new(config, clock, services).unwrap();
        Harness {
            system,
            messages,
            indicators,
        }
    }

    #[rstest]
    #[case(0, INDICATOR_YELLOW)]
    #[case(49, INDICATOR_YELLOW)]
    #[case(50, INDICATOR_ORANGE)]
    #[case(74, INDICATOR_ORANGE)]
    #[case(75, INDICATOR_GOLD)]
    #[case(100, INDICATOR_GOLD)]
    fn indicator_color_thresholds(#[case] percent: u8, #[case] expected: u32) {
        assert_eq!(indicator_color(percent), expected);
    }

    #[test]
    fn starter_tasks_are_loaded_once() {
        let mut h = harness(true);
        assert_eq!(h.system.registry().active_tasks().len(), 8);
        assert_eq!(h.system.registry().config().max_completed_tasks, 50);
        assert!(h.system.registry().is_initialized());
        assert_eq!(h.system.load_default_tasks(), 0);
    }

    #[test]
    fn indicators_follow_sprites_and_progress() {
        let mut h = harness(true);
        // cow1 と chicken1 だけスプライトがある
        assert_eq!(h.indicators.task_ids(), vec!["chicken1", "cow1"]);
        let cow = h.indicators.get("cow1").unwrap();
        assert_eq!(cow.at, ScreenPos::new(100.0, 180.0));
        assert_eq!(cow.style, IndicatorStyle { color: INDICATOR_YELLOW, glowing: true });

        h.system.handle_animal_interaction("cow1", Some("feed"));
        assert_eq!(h.indicators.get("cow1").unwrap().style.color, INDICATOR_ORANGE);

        h.system.handle_animal_interaction("cow1", Some("talk"));
        assert!(h.indicators.get("cow1").is_none());
    }

    #[test]
    fn interaction_messages() {
        let mut h = harness(true);
        assert!(!h.system.handle_animal_interaction("cow1", None));
        assert!(h.system.handle_animal_interaction("cow1", None));

        assert_eq!(
            h.messages.texts(),
            vec!["You feed cow1!", "You talk cow1!", "cow1 is happy for today!"]
        );
        assert!(!h.system.handle_animal_interaction("cow1", None));
        assert!(!h.system.handle_animal_interaction("pig1", Some("feed")));
        assert_eq!(h.messages.texts().len(), 3);
    }

    #[test]
    fn handle_animal_task_walks_remaining_actions() {
        let mut h = harness(true);
        assert!(!h.system.handle_animal_task("cowBaby"));
        assert!(!h.system.handle_animal_task("cowBaby"));
        assert!(h.system.handle_animal_task("cowBaby"));
        assert!(!h.system.handle_animal_task("cowBaby"));
        assert!(h.messages.texts().is_empty());
    }

    #[test]
    fn legacy_projections() {
        let mut h = harness(true);
        h.system.handle_animal_interaction("chicken2", Some("talk"));

        let flags = h.system.animal_tasks();
        assert_eq!(flags.len(), 8);
        assert_eq!(flags["chicken2"], AnimalFlags { feed: false, talk: true });

        let list = h.system.compatible_active_tasks();
        assert_eq!(list.len(), 8);
        // priority high の cowBaby が先頭
        assert_eq!(list[0].id, "cowBaby");
        assert_eq!(list[0].instruction, "cowBaby: feed and talk and pet");

        let progress = h.system.compatible_progress();
        assert_eq!((progress.completed, progress.total), (0, 8));
    }

    #[test]
    fn all_animals_complete_after_every_animal_is_done() {
        let mut h = harness(true);
        assert!(!h.system.are_all_animals_complete());
        let ids: Vec<String> = h.system.animal_tasks().into_keys().collect();
        for id in ids {
            while h.system.has_active_tasks_for_target(&id) {
                h.system.handle_animal_task(&id);
            }
        }
        assert!(h.system.are_all_animals_complete());
        assert_eq!(h.system.progress().percentage, 100);
    }

    #[test]
    fn scene_and_menu_state_live_in_the_session_context() {
        let mut h = harness(false);
        h.system.update_scene("farm");
        h.system.update_scene("barn");

        assert_eq!(h.system.context().previous_scene(), Some("farm"));
        assert_eq!(h.system.registry().current_scene(), Some("barn"));
        assert!(h.system.toggle_task_menu());
        assert!(h.system.context().is_task_menu_open());
    }

    #[test]
    fn destroy_removes_indicators() {
        let h = harness(true);
        assert!(!h.indicators.is_empty());
        h.system.destroy();
        assert!(h.indicators.is_empty());
    }
}
