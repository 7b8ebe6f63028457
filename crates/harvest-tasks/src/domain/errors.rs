//! Errors - エラー型と分類
//!
//! 構築時のエラーだけが `Err` になる。ゲームプレイ中の「見つからない」「対象外のアクション」は
//! エラーではなく warn ログ + `false` / `None` で扱う。

use thiserror::Error;

use super::kind::TaskKind;

/// TaskError はタスク構築時のエラー（Catalog / 呼び出し側のバグ）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task must have an id")]
    MissingId,

    #[error("task '{id}' must have a title")]
    MissingTitle { id: String },

    #[error("task '{id}' lists action '{action}' more than once")]
    DuplicateAction { id: String, action: String },

    #[error("task '{id}' has no required actions")]
    EmptyRequiredActions { id: String },

    #[error("task '{id}' has no required items")]
    EmptyRequiredItems { id: String },

    #[error("unknown task kind: {0}")]
    UnknownKind(TaskKind),
}

/// FactoryError は task kind 登録時のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FactoryError {
    #[error("task kind name must not be empty")]
    EmptyKind,

    #[error("constructor for kind '{kind}' does not satisfy the task contract: {reason}")]
    NonConforming { kind: TaskKind, reason: String },
}

/// CatalogError は静的コンテンツの読み込みエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed task catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no catalog entry for task '{0}'")]
    UnknownTask(String),
}
