//! Ports - 抽象化レイヤー
//!
//! core が依存する外部のもの（時刻、ID 生成、画面表示）を trait で切り出す。

pub mod clock;
pub mod id_generator;
pub mod presentation;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::presentation::{
    IndicatorSink, IndicatorStyle, MessageDisplay, MessageTone, ScreenPos, SpriteLocator,
};
