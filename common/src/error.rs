//! エラー型定義

use thiserror::Error;

/// JSONL読み込みエラー（ロード全体が失敗し、ストアは変更されない）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("{line}行目のパースに失敗: {message}")]
    ParseFailure { line: usize, message: String },
}

/// インデックス範囲外
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("インデックス {index} は範囲外です（件数: {size}）")]
    OutOfBounds { index: usize, size: usize },
}

/// セッションスナップショット復元エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("スナップショットが不正: {0}")]
    Malformed(String),

    #[error("スナップショットに必須キーがありません: {0}")]
    MissingKey(&'static str),
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
