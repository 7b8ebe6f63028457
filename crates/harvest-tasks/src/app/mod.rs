//! App - アプリケーション層
//!
//! domain と ports を組み合わせてタスク追跡のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **EventHub**: 同期 publish/subscribe
//! - **TaskFactory**: kind 名 → Task の構築
//! - **TaskRegistry**: ライブなタスク状態、入口、集計

pub mod config;
pub mod display;
pub mod event_hub;
pub mod factory;
pub mod registry;

// 主要な型を再エクスポート
pub use self::config::RegistryConfig;
pub use self::display::{DisplayOptions, OverallProgress, SortBy, TaskStatistics, TaskView};
pub use self::event_hub::{DispatchReport, EventHub, HubEvent, ListenerError, ListenerId, ListenerResult};
pub use self::factory::{TaskConstructor, TaskFactory};
pub use self::registry::{NewTask, TaskRegistry};
