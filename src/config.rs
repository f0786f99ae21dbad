use crate::error::{LabelerError, Result};
use labeler_common::paginator::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 1ページの表示件数
    pub page_size: usize,
    /// エクスポート先（未設定なら入力ファイルと同じ場所）
    pub output_dir: Option<PathBuf>,
    /// セッション保存先（未設定ならカレント）
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            output_dir: None,
            snapshot_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LabelerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("jsonl-labeler").join("config.json"))
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(LabelerError::Config("ページ件数は1以上にしてください".into()));
        }
        self.page_size = page_size;
        Ok(())
    }

    /// エクスポート先: 設定値 → 入力ファイルのディレクトリ → カレント
    pub fn export_dir_for(&self, input: Option<&Path>) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        input
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// セッション保存の既定パス
    pub fn default_snapshot_path(&self, source_name: Option<&str>) -> PathBuf {
        let stem = source_name
            .and_then(|n| Path::new(n).file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("labeling");
        let dir = self
            .snapshot_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join(format!("{}.session.json", stem))
    }
}
