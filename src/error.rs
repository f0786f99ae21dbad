use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("データ読み込みエラー: {0}")]
    Load(#[from] labeler_common::LoadError),

    #[error("セッション復元エラー: {0}")]
    Snapshot(#[from] labeler_common::SnapshotError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("入力エラー: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, LabelerError>;
