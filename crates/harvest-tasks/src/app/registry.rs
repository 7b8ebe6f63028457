//! TaskRegistry - ライブなタスク状態の唯一の持ち主
//!
//! # 責務
//! - active / completed / failed の 3 コレクションを所有する
//! - ゲーム世界からの操作（動物との交流、アイテム収集）の入口
//! - UI 向けの集計（全体進捗、表示用リスト）
//!
//! # イベント
//! Task は Registry を知らない。Task の変更系メソッドが返す [`ProgressReport`] を見て
//! Registry が `task:progress` → `task:completed` → 入口ごとのイベントの順に emit する。
//!
//! 見つからない / kind 違いは warn ログ + `false`。`Err` になるのは構築エラーだけ。

use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::app::config::RegistryConfig;
use crate::app::display::{DisplayOptions, OverallProgress, SortBy, TaskStatistics, TaskView};
use crate::app::event_hub::EventHub;
use crate::app::factory::TaskFactory;
use crate::domain::animal::ratio_percent;
use crate::domain::{
    ProgressMap, ProgressReport, SessionId, Task, TaskConfig, TaskError, TaskEvent, TaskKind,
};
use crate::ports::{Clock, IdGenerator, UlidGenerator};

/// Input to [`TaskRegistry::add_task`]: a config record for the factory, or a
/// task that is already built.
#[derive(Debug, Clone)]
pub enum NewTask {
    Config(TaskConfig),
    Built(Task),
}

impl From<TaskConfig> for NewTask {
    fn from(config: TaskConfig) -> Self {
        NewTask::Config(config)
    }
}

impl From<Task> for NewTask {
    fn from(task: Task) -> Self {
        NewTask::Built(task)
    }
}

pub struct TaskRegistry {
    config: RegistryConfig,
    factory: TaskFactory,
    clock: Rc<dyn Clock>,
    session: SessionId,
    events: EventHub<TaskEvent>,
    // 挿入順を保つ（表示のソートは安定ソート）
    active: Vec<Task>,
    completed: VecDeque<Task>,
    failed: VecDeque<Task>,
    statistics: TaskStatistics,
    current_scene: Option<String>,
    initialized: bool,
}

impl TaskRegistry {
    /// A registry whose factory knows the built-in kinds.
    pub fn new(config: RegistryConfig, clock: Rc<dyn Clock>) -> Self {
        let factory = TaskFactory::with_builtin_kinds(clock);
        Self::with_factory(config, factory)
    }

    /// A registry using `factory` (and its clock) for config-based admission.
    pub fn with_factory(config: RegistryConfig, factory: TaskFactory) -> Self {
        let clock = Rc::clone(factory.clock());
        let session = UlidGenerator::new(Rc::clone(&clock)).generate_session_id();
        debug!(session = %session, max_completed_tasks = config.max_completed_tasks, "task registry created");
        Self {
            config,
            factory,
            clock,
            session,
            events: EventHub::new(),
            active: Vec::new(),
            completed: VecDeque::new(),
            failed: VecDeque::new(),
            statistics: TaskStatistics::default(),
            current_scene: None,
            initialized: false,
        }
    }

    /// Emit `manager:initialized` once. Later calls do nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.events.emit(&TaskEvent::ManagerInitialized {
            session: self.session,
        });
        info!(session = %self.session, "task registry initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn factory(&self) -> &TaskFactory {
        &self.factory
    }

    /// For registering extra kinds.
    pub fn factory_mut(&mut self) -> &mut TaskFactory {
        &mut self.factory
    }

    /// The registry's event hub. Clone it to keep a handle.
    pub fn events(&self) -> &EventHub<TaskEvent> {
        &self.events
    }

    // === Admission ===

    /// Admit a task, building it through the factory when given a config.
    ///
    /// An active task with the same id is replaced in place.
    pub fn add_task(&mut self, task: impl Into<NewTask>) -> Result<&Task, TaskError> {
        let task = match task.into() {
            NewTask::Config(config) => {
                let kind = config.kind.clone();
                let id = config.id.clone();
                self.factory.create_task(&kind, id, config)?
            }
            NewTask::Built(task) => task,
        };

        let index = match self.active_index(task.id()) {
            Some(index) => {
                warn!(task_id = %task.id(), session = %self.session, "replacing active task with the same id");
                self.active[index] = task;
                index
            }
            None => {
                self.active.push(task);
                self.active.len() - 1
            }
        };
        self.statistics.tasks_created += 1;

        let added = &self.active[index];
        info!(task_id = %added.id(), kind = %added.kind(), session = %self.session, "task added");
        self.events.emit(&TaskEvent::TaskAdded {
            task: added.clone(),
        });
        Ok(&self.active[index])
    }

    pub fn remove_task(&mut self, id: &str) -> bool {
        let Some(index) = self.active_index(id) else {
            warn!(task_id = id, session = %self.session, "task not found for removal");
            return false;
        };
        let task = self.active.remove(index);
        info!(task_id = id, session = %self.session, "task removed");
        self.events.emit(&TaskEvent::TaskRemoved { task });
        true
    }

    /// Look up a task in active, then completed, then failed history.
    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.active
            .iter()
            .chain(self.completed.iter())
            .chain(self.failed.iter())
            .find(|task| task.id() == id)
    }

    // === Gameplay entry points ===

    /// Merge progress into an active task. Returns whether it is completed.
    pub fn update_task_progress(&mut self, id: &str, data: &ProgressMap) -> bool {
        let Some(index) = self.active_index(id) else {
            warn!(task_id = id, session = %self.session, "task not found for progress update");
            return false;
        };
        let now = self.clock.now();
        let report = self.active[index].update_progress(data, now);
        self.settle(index, report);
        report.completed
    }

    /// Perform `action` on the animal task `animal_name`. Returns whether it is completed.
    pub fn handle_animal_interaction(&mut self, animal_name: &str, action: &str) -> bool {
        let Some(index) = self.active_index(animal_name) else {
            warn!(task_id = animal_name, action, session = %self.session, "animal task not found");
            return false;
        };
        if self.active[index].as_animal().is_none() {
            warn!(
                task_id = animal_name,
                kind = %self.active[index].kind(),
                session = %self.session,
                "task is not an animal task"
            );
            return false;
        }

        let now = self.clock.now();
        let report = self.active[index].perform_action(action, now);
        let task = self.settle(index, report);

        debug!(task_id = animal_name, action, completed = report.completed, "animal interaction");
        self.events.emit(&TaskEvent::AnimalInteraction {
            animal_name: animal_name.to_string(),
            action: action.to_string(),
            task,
        });
        report.completed
    }

    /// Add collected items to collection task `id`. Returns whether it is completed.
    pub fn handle_item_collection(
        &mut self,
        id: &str,
        item: &str,
        amount: u32,
        location: Option<&str>,
    ) -> bool {
        let Some(index) = self.active_index(id) else {
            warn!(task_id = id, item, session = %self.session, "collection task not found");
            return false;
        };
        if self.active[index].as_collection().is_none() {
            warn!(
                task_id = id,
                kind = %self.active[index].kind(),
                session = %self.session,
                "task is not a collection task"
            );
            return false;
        }

        let now = self.clock.now();
        let report = self.active[index].collect_item(item, amount, location, now);
        let task = self.settle(index, report);

        debug!(task_id = id, item, amount, completed = report.completed, "item collected");
        self.events.emit(&TaskEvent::ItemCollected {
            task_id: id.to_string(),
            item: item.to_string(),
            amount,
            location: location.map(str::to_string),
            task,
        });
        report.completed
    }

    /// Force completion of an active task. False if it is not active here.
    pub fn complete_task(&mut self, id: &str) -> bool {
        let Some(index) = self.active_index(id) else {
            warn!(task_id = id, session = %self.session, "task not found for completion");
            return false;
        };
        let now = self.clock.now();
        if self.active[index].complete(now) {
            self.handle_completion(index);
        }
        true
    }

    /// active -> failed; the task moves to the failed history.
    pub fn fail_task(&mut self, id: &str) -> bool {
        let Some(index) = self.active_index(id) else {
            warn!(task_id = id, session = %self.session, "task not found for failure");
            return false;
        };
        if !self.active[index].fail() {
            warn!(task_id = id, status = %self.active[index].status(), "task cannot fail from its current status");
            return false;
        }

        let task = self.active.remove(index);
        self.statistics.tasks_failed += 1;
        info!(task_id = id, kind = %task.kind(), session = %self.session, "task failed");
        let snapshot = task.clone();
        push_capped(&mut self.failed, task, self.config.max_completed_tasks);
        self.events.emit(&TaskEvent::TaskFailed { task: snapshot });
        true
    }

    /// Clear the progress of an active task.
    ///
    /// Completed and failed tasks are never re-admitted.
    pub fn reset_task(&mut self, id: &str) -> bool {
        let Some(index) = self.active_index(id) else {
            if self.get_task(id).is_some() {
                warn!(task_id = id, session = %self.session, "finished tasks cannot be reset");
            } else {
                warn!(task_id = id, session = %self.session, "task not found for reset");
            }
            return false;
        };
        let task = &mut self.active[index];
        task.reset();
        debug!(task_id = id, "task reset");
        self.events.emit(&TaskEvent::TaskProgress {
            task: task.clone(),
            progress: task.progress().clone(),
        });
        true
    }

    // === Queries ===

    pub fn overall_progress(&self) -> OverallProgress {
        let active = self.active_tasks();
        let completed = self.statistics.tasks_completed;
        let total = active.len() + completed;
        if total == 0 {
            return OverallProgress {
                completed: 0,
                total: 1,
                active: 0,
                percentage: 0,
            };
        }

        let points = completed as u64 * 100
            + active
                .iter()
                .map(|task| u64::from(task.progress_percentage()))
                .sum::<u64>();
        OverallProgress {
            completed,
            total,
            active: active.len(),
            percentage: ratio_percent(points, total as u64 * 100),
        }
    }

    pub fn tasks_for_display(&self, options: &DisplayOptions) -> Vec<TaskView> {
        let mut tasks = self.active_tasks();
        if options.include_completed {
            tasks.extend(self.completed.iter());
        }
        if let Some(kind) = &options.filter_kind {
            tasks.retain(|task| task.kind() == kind);
        }
        match options.sort_by {
            SortBy::Priority => tasks.sort_by(|a, b| b.priority().cmp(&a.priority())),
            SortBy::CreatedAt => tasks.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
            SortBy::Progress => {
                tasks.sort_by(|a, b| b.progress_percentage().cmp(&a.progress_percentage()))
            }
        }
        tasks
            .into_iter()
            .take(options.max_tasks)
            .map(TaskView::from)
            .collect()
    }

    pub fn has_active_tasks_for_target(&self, id: &str) -> bool {
        self.get_task(id).is_some_and(Task::is_active)
    }

    pub fn tasks_by_kind(&self, kind: &TaskKind) -> Vec<&Task> {
        self.active.iter().filter(|task| task.kind() == kind).collect()
    }

    pub fn active_tasks(&self) -> Vec<&Task> {
        self.active.iter().filter(|task| task.is_active()).collect()
    }

    /// Completed history, oldest first.
    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.completed.iter().collect()
    }

    /// Failed history, oldest first.
    pub fn failed_tasks(&self) -> Vec<&Task> {
        self.failed.iter().collect()
    }

    pub fn statistics(&self) -> TaskStatistics {
        self.statistics
    }

    // === Scene ===

    pub fn update_scene(&mut self, scene: impl Into<String>) {
        let scene = scene.into();
        info!(scene = %scene, session = %self.session, "scene changed");
        self.current_scene = Some(scene.clone());
        self.events.emit(&TaskEvent::SceneChanged { scene });
    }

    pub fn current_scene(&self) -> Option<&str> {
        self.current_scene.as_deref()
    }

    /// Drop every listener and task. The registry cannot be used afterwards.
    pub fn destroy(self) {
        self.events.remove_all_listeners(None);
        info!(session = %self.session, "task registry destroyed");
    }

    // === internals ===

    fn active_index(&self, id: &str) -> Option<usize> {
        self.active.iter().position(|task| task.id() == id)
    }

    /// Emit what a mutation did and move the task out if it just completed.
    /// Returns the post-mutation snapshot.
    /// `task:progress` carries the merged progress map, not the caller's change.
    fn settle(&mut self, index: usize, report: ProgressReport) -> Task {
        let snapshot = self.active[index].clone();
        if report.applied {
            self.events.emit(&TaskEvent::TaskProgress {
                task: snapshot.clone(),
                progress: snapshot.progress().clone(),
            });
        }
        if report.newly_completed {
            self.handle_completion(index);
        }
        snapshot
    }

    fn handle_completion(&mut self, index: usize) {
        let task = self.active.remove(index);
        self.statistics.tasks_completed += 1;
        info!(task_id = %task.id(), kind = %task.kind(), session = %self.session, "task completed");
        let snapshot = task.clone();
        push_capped(&mut self.completed, task, self.config.max_completed_tasks);
        self.events.emit(&TaskEvent::TaskCompleted { task: snapshot });
    }
}

/// Append to a bounded history, evicting the oldest entries past `cap`.
/// An entry with the same id keeps its position.
fn push_capped(history: &mut VecDeque<Task>, task: Task, cap: usize) {
    match history.iter().position(|t| t.id() == task.id()) {
        Some(index) => history[index] = task,
        None => history.push_back(task),
    }
    while history.len() > cap {
        if let Some(evicted) = history.pop_front() {
            debug!(task_id = %evicted.id(), "evicted from task history");
        }
    }
}
