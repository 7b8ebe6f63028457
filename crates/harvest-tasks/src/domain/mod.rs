//! Domain model (ids, kinds, config records, tasks, events, errors).

pub mod animal;
pub mod collection;
pub mod config;
pub mod errors;
pub mod events;
pub mod ids;
pub mod kind;
pub mod progress;
pub mod state;
pub mod task;

pub use animal::AnimalCare;
pub use collection::ItemCollection;
pub use config::{Priority, PriorityLevel, Rewards, TaskConfig};
pub use errors::{CatalogError, FactoryError, TaskError};
pub use events::{TaskEvent, TaskEventKind};
pub use ids::{SessionId, Session};
pub use kind::TaskKind;
pub use progress::{ProgressMap, ProgressReport, ProgressValue};
pub use state::TaskStatus;
pub use task::{Task, TaskBody};
