//! 標注結果エクスポート
//!
//! 常に全件（フィルタ無関係）を元の順序でJSONLにする。

use crate::store::RecordStore;
use chrono::{DateTime, TimeZone};
use std::path::Path;

pub const EXPORT_MIME_TYPE: &str = "application/json";

const DEFAULT_BASE_NAME: &str = "data";
const EXPORT_SUFFIX: &str = "labeled_data.jsonl";

/// ダウンロード側に渡すファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content: String,
    pub mime_type: &'static str,
}

/// 全件をJSONLに変換
pub fn export_all(store: &RecordStore) -> serde_json::Result<String> {
    store.export_all()
}

/// `{元ファイル名}_{タイムスタンプ}_labeled_data.jsonl`
///
/// 同じ作業中に何度書き出しても上書きしないようタイムスタンプを含める。
pub fn export_file_name<Tz>(source_name: Option<&str>, timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let base = source_name
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_BASE_NAME);
    format!(
        "{}_{}_{}",
        base,
        timestamp.format("%Y%m%d_%H%M%S"),
        EXPORT_SUFFIX
    )
}

/// エクスポートファイルを組み立てる
pub fn build_export<Tz>(
    store: &RecordStore,
    source_name: Option<&str>,
    timestamp: &DateTime<Tz>,
) -> serde_json::Result<ExportFile>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let file = ExportFile {
        file_name: export_file_name(source_name, timestamp),
        content: export_all(store)?,
        mime_type: EXPORT_MIME_TYPE,
    };
    tracing::info!(file = %file.file_name, records = store.len(), "built export");
    Ok(file)
}

/// ディレクトリに書き出し、書き出したパスを返す
pub fn write_export(dir: &Path, file: &ExportFile) -> std::io::Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.content)?;
    Ok(path)
}
