//! harvest-tasks
//!
//! Task tracking core for the farm game: quests, their progress, completion
//! rules, and the events the UI listens to.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, kind, config, progress, task, events, errors）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, SpriteLocator, MessageDisplay, IndicatorSink）
//! - **app**: アプリケーションロジック（EventHub, TaskFactory, TaskRegistry）
//! - **catalog**: 静的タスクコンテンツ（埋め込み JSON）
//! - **integration**: 旧 API 互換の façade（TaskSystem）と SessionContext
//! - **impls**: presentation ports の実装（開発用・テスト用）
//!
//! 単一スレッド・同期。ログは `tracing` マクロのみで、subscriber は入れない。

pub mod domain;
pub mod ports;
pub mod app;
pub mod catalog;
pub mod integration;
pub mod impls;

pub use app::{
    DisplayOptions, EventHub, NewTask, OverallProgress, RegistryConfig, SortBy, TaskFactory,
    TaskRegistry, TaskView,
};
pub use catalog::TaskCatalog;
pub use domain::{
    Priority, PriorityLevel, ProgressMap, ProgressValue, Task, TaskConfig, TaskError, TaskEvent,
    TaskEventKind, TaskKind, TaskStatus,
};
pub use integration::{PresentationServices, SessionContext, TaskSystem, TaskSystemConfig};
