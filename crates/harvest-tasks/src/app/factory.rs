//! TaskFactory - kind 名から Task を構築する
//!
//! # 設計
//! - kind 名 → コンストラクタ関数のテーブル（型の継承ではなく関数で拡張）
//! - 登録時にプローブを一度構築して契約を検査する（Fail-fast）
//! - 構築時刻は注入された Clock から取る

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{FactoryError, Task, TaskConfig, TaskError, TaskKind};
use crate::ports::Clock;

/// Builds a task of one kind from its config and creation time.
pub type TaskConstructor = Rc<dyn Fn(TaskConfig, DateTime<Utc>) -> Result<Task, TaskError>>;

const PROBE_ID: &str = "__kind_probe__";

pub struct TaskFactory {
    clock: Rc<dyn Clock>,
    constructors: BTreeMap<TaskKind, TaskConstructor>,
}

impl TaskFactory {
    /// An empty factory with no kinds registered.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            constructors: BTreeMap::new(),
        }
    }

    /// A factory with `basic`, `animal` and `collection` registered.
    pub fn with_builtin_kinds(clock: Rc<dyn Clock>) -> Self {
        let mut factory = Self::new(clock);
        factory
            .constructors
            .insert(TaskKind::basic(), Rc::new(Task::basic));
        factory
            .constructors
            .insert(TaskKind::animal(), Rc::new(Task::animal));
        factory
            .constructors
            .insert(TaskKind::collection(), Rc::new(Task::collection));
        factory
    }

    /// Add or replace the constructor for `kind`.
    ///
    /// The constructor is probed once. It is rejected when the probe fails to
    /// build, reports another kind, is not active, or starts with progress.
    pub fn register_task_type<F>(
        &mut self,
        kind: impl Into<TaskKind>,
        constructor: F,
    ) -> Result<(), FactoryError>
    where
        F: Fn(TaskConfig, DateTime<Utc>) -> Result<Task, TaskError> + 'static,
    {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(FactoryError::EmptyKind);
        }

        let probe_config = TaskConfig::new(kind.clone(), PROBE_ID)
            .with_title("probe")
            .with_required_actions(["probe"])
            .with_required_item("probe", 1);
        let probe = constructor(probe_config, self.clock.now()).map_err(|err| {
            FactoryError::NonConforming {
                kind: kind.clone(),
                reason: format!("probe construction failed: {err}"),
            }
        })?;

        let reason = if probe.kind() != &kind {
            Some(format!("probe reports kind '{}'", probe.kind()))
        } else if !probe.is_active() {
            Some(format!("probe starts as {}", probe.status()))
        } else if probe.progress_percentage() != 0 {
            Some(format!("probe starts at {}%", probe.progress_percentage()))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(FactoryError::NonConforming { kind, reason });
        }

        debug!(kind = %kind, "task kind registered");
        self.constructors.insert(kind, Rc::new(constructor));
        Ok(())
    }

    /// Build a task of `kind`. `config.kind` and `config.id` are overwritten.
    pub fn create_task(
        &self,
        kind: &TaskKind,
        id: impl Into<String>,
        mut config: TaskConfig,
    ) -> Result<Task, TaskError> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| TaskError::UnknownKind(kind.clone()))?;
        config.kind = kind.clone();
        config.id = id.into();
        constructor(config, self.clock.now())
    }

    /// Build each record with its own kind and id, keeping input order.
    ///
    /// A failing record yields its error in place; the others still build.
    pub fn create_tasks_from_config(
        &self,
        configs: Vec<TaskConfig>,
    ) -> Vec<Result<Task, TaskError>> {
        configs
            .into_iter()
            .map(|config| {
                let kind = config.kind.clone();
                let id = config.id.clone();
                self.create_task(&kind, id, config)
            })
            .collect()
    }

    /// An animal task titled "Care for <name>" requiring feed and talk.
    ///
    /// `customize` sees the defaults and may override any of them.
    pub fn create_animal_task(
        &self,
        animal_name: &str,
        customize: impl FnOnce(TaskConfig) -> TaskConfig,
    ) -> Result<Task, TaskError> {
        let defaults = TaskConfig::new(TaskKind::animal(), animal_name)
            .with_animal_name(animal_name)
            .with_title(format!("Care for {animal_name}"))
            .with_description(format!("Feed and talk to {animal_name}"))
            .with_required_actions(["feed", "talk"]);
        let config = customize(defaults);
        self.create_task(&TaskKind::animal(), animal_name, config)
    }

    pub fn registered_kinds(&self) -> Vec<TaskKind> {
        self.constructors.keys().cloned().collect()
    }

    pub fn is_kind_registered(&self, kind: &TaskKind) -> bool {
        self.constructors.contains_key(kind)
    }

    pub(crate) fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskBody, TaskStatus};
    use crate::ports::FixedClock;
    use chrono::TimeZone;
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn factory() -> TaskFactory {
        TaskFactory::with_builtin_kinds(Rc::new(FixedClock::new(t0())))
    }

    #[test]
    fn builtin_kinds_are_registered() {
        let f = factory();
        assert_eq!(
            f.registered_kinds(),
            vec![TaskKind::animal(), TaskKind::basic(), TaskKind::collection()]
        );
        assert!(f.is_kind_registered(&TaskKind::animal()));
        assert!(!f.is_kind_registered(&TaskKind::new("fishing")));
    }

    #[test]
    fn create_task_seeds_kind_id_and_time() {
        let f = factory();
        let config = TaskConfig::new("ignored", "ignored").with_title("Sweep");
        let task = f.create_task(&TaskKind::basic(), "sweep", config).unwrap();

        assert_eq!(task.id(), "sweep");
        assert_eq!(task.kind(), &TaskKind::basic());
        assert_eq!(task.created_at(), t0());
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = factory()
            .create_task(&TaskKind::new("fishing"), "trout", TaskConfig::default())
            .unwrap_err();
        assert_eq!(err, TaskError::UnknownKind(TaskKind::new("fishing")));
    }

    #[test]
    fn create_tasks_from_config_keeps_order_and_isolates_failures() {
        let f = factory();
        let configs = vec![
            TaskConfig::new("animal", "cow1"),
            TaskConfig::new("basic", "untitled"),
            TaskConfig::new("animal", "chicken1"),
        ];

        let results = f.create_tasks_from_config(configs);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id(), "cow1");
        assert_eq!(
            results[1].as_ref().unwrap_err(),
            &TaskError::MissingTitle { id: "untitled".into() }
        );
        assert_eq!(results[2].as_ref().unwrap().id(), "chicken1");
    }

    #[test]
    fn create_animal_task_defaults_and_overrides() {
        let f = factory();
        let task = f.create_animal_task("Bessie", |c| c).unwrap();
        assert_eq!(task.title(), "Care for Bessie");
        assert_eq!(task.description(), "Feed and talk to Bessie");
        assert_eq!(task.remaining_actions(), vec!["feed", "talk"]);

        let task = f
            .create_animal_task("Bessie", |c| c.with_required_actions(["pet"]).with_title("Pet Bessie"))
            .unwrap();
        assert_eq!(task.title(), "Pet Bessie");
        assert_eq!(task.remaining_actions(), vec!["pet"]);
    }

    #[test]
    fn register_custom_kind() {
        let mut f = factory();
        f.register_task_type("chore", |config, now| {
            Task::new(config, TaskBody::Basic, now)
        })
        .unwrap();

        let task = f
            .create_task(&TaskKind::new("chore"), "sweep", TaskConfig::default().with_title("Sweep"))
            .unwrap();
        assert_eq!(task.kind().as_str(), "chore");
        assert_eq!(task.status(), TaskStatus::Active);
    }

    #[test]
    fn empty_kind_is_rejected() {
        let err = factory().register_task_type("", Task::basic).unwrap_err();
        assert_eq!(err, FactoryError::EmptyKind);
    }

    fn fails_to_build(_: TaskConfig, _: DateTime<Utc>) -> Result<Task, TaskError> {
        Err(TaskError::MissingId)
    }

    fn reports_basic(mut config: TaskConfig, now: DateTime<Utc>) -> Result<Task, TaskError> {
        config.kind = TaskKind::basic();
        Task::basic(config, now)
    }

    fn starts_failed(config: TaskConfig, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let mut task = Task::basic(config, now)?;
        task.fail();
        Ok(task)
    }

    fn starts_completed(config: TaskConfig, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let mut task = Task::basic(config, now)?;
        task.complete(now);
        Ok(task)
    }

    #[rstest]
    #[case::fails_to_build(fails_to_build)]
    #[case::wrong_kind(reports_basic)]
    #[case::starts_failed(starts_failed)]
    #[case::starts_completed(starts_completed)]
    fn non_conforming_constructors_are_rejected(
        #[case] constructor: fn(TaskConfig, DateTime<Utc>) -> Result<Task, TaskError>,
    ) {
        let mut f = factory();
        let err = f.register_task_type("broken", constructor).unwrap_err();
        assert!(matches!(err, FactoryError::NonConforming { .. }), "{err:?}");
        assert!(!f.is_kind_registered(&TaskKind::new("broken")));
    }
}
