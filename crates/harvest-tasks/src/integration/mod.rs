//! Integration - 旧来の呼び出し形に合わせた façade とセッション状態

pub mod context;
pub mod system;

pub use self::context::SessionContext;
pub use self::system::{
    AnimalFlags, CompatibleProgress, CompatibleTask, PresentationServices, TaskSystem,
    TaskSystemConfig, indicator_color,
};
