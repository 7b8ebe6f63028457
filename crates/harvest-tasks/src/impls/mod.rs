//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには presentation ports の実装を含めます。
//!
//! # 含まれる実装
//! - **StaticSprites**: 固定のスプライト座標表
//! - **ConsoleMessages** / **RecordingMessages**: メッセージ表示
//! - **InMemoryIndicators**: インジケータの状態記録
//!
//! ゲームエンジン側の実装はこのクレートには含めません。

pub mod inmem_indicators;
pub mod messages;
pub mod static_sprites;

// 主要な型を再エクスポート
pub use self::inmem_indicators::{InMemoryIndicators, Indicator};
pub use self::messages::{ConsoleMessages, RecordingMessages};
pub use self::static_sprites::StaticSprites;
