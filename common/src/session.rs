//! 標注セッション
//!
//! ストア・フィルタ条件・ページ状態をまとめて持つ明示的なオブジェクト。
//! 画面側の各ハンドラはこれを受け取って操作し、表示は `view()` で毎回
//! 現在の状態から計算し直す。

use crate::error::{IndexError, LoadError, SnapshotError};
use crate::export::{build_export, ExportFile};
use crate::filter::{self, FilterSpec};
use crate::paginator::Paginator;
use crate::record::{AnnotationField, Label, Record};
use crate::snapshot;
use crate::store::{RecordStore, Stats};
use chrono::{DateTime, TimeZone};

/// 表示用に計算したページ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// 表示するレコードの元インデックス
    pub items: Vec<usize>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    store: RecordStore,
    filter: FilterSpec,
    paginator: Paginator,
    source_name: Option<String>,
    data_loaded: bool,
    dirty: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(crate::paginator::DEFAULT_PAGE_SIZE)
    }
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self {
            store: RecordStore::new(),
            filter: FilterSpec::for_records(&[]),
            paginator: Paginator::new(page_size),
            source_name: None,
            data_loaded: false,
            dirty: false,
        }
    }

    /// JSONLを読み込む。失敗時は現在の状態を変更しない。
    pub fn load(&mut self, source_name: Option<&str>, content: &str) -> Result<(), LoadError> {
        self.store.load_str(content)?;
        self.filter = FilterSpec::for_records(self.store.records());
        self.paginator.reset();
        self.source_name = source_name.map(str::to_string);
        self.data_loaded = true;
        self.dirty = false;
        Ok(())
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn record(&self, index: usize) -> Option<&Record> {
        self.store.get(index)
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.data_loaded
    }

    /// 最後のエクスポート以降に変更があるか
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> Stats {
        self.store.stats()
    }

    fn filtered(&self) -> Vec<usize> {
        filter::apply(self.store.records(), &self.filter)
    }

    /// 現在の状態からページを計算する（丸めたページ番号は状態に反映）
    pub fn view(&mut self) -> PageView {
        let filtered = self.filtered();
        let page = self.paginator.page(&filtered);
        PageView {
            items: page.items.to_vec(),
            page: page.clamped_page,
            total_pages: page.total_pages,
            filtered_count: filtered.len(),
        }
    }

    /// ラベル変更。フィルタから外れて件数が減った場合もページを収め直す。
    pub fn set_label(&mut self, index: usize, label: Label) -> Result<(), IndexError> {
        let before = self.store.get(index).map(|r| r.label);
        self.store.mutate_label(index, label)?;
        if before != Some(label) {
            self.dirty = true;
        }
        let count = self.filtered().len();
        self.paginator.clamp(count);
        Ok(())
    }

    pub fn set_annotation_field(
        &mut self,
        index: usize,
        field: AnnotationField,
        value: &str,
    ) -> Result<bool, IndexError> {
        let changed = self.store.mutate_annotation_field(index, field, value)?;
        if changed {
            self.dirty = true;
            let count = self.filtered().len();
            self.paginator.clamp(count);
        }
        Ok(changed)
    }

    /// フィルタ条件を差し替える（データに合わせて補正する）
    pub fn set_filter(&mut self, mut spec: FilterSpec) {
        spec.reconcile(self.store.records());
        self.filter = spec;
        let count = self.filtered().len();
        self.paginator.clamp(count);
    }

    /// 絞り込みを解除する
    pub fn reset_filter(&mut self) {
        self.set_filter(FilterSpec::for_records(self.store.records()));
    }

    pub fn next_page(&mut self) {
        let count = self.filtered().len();
        self.paginator.next(count);
    }

    pub fn previous_page(&mut self) {
        self.paginator.previous();
    }

    pub fn go_to_page(&mut self, page: usize) {
        let count = self.filtered().len();
        self.paginator.go_to(page, count);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let count = self.filtered().len();
        self.paginator.set_page_size(page_size, count);
    }

    /// スナップショットを作る
    pub fn snapshot(&self) -> serde_json::Result<String> {
        snapshot::save_with_source(
            &self.store,
            &self.filter,
            &self.paginator,
            self.source_name.as_deref(),
        )
    }

    /// スナップショットで状態を丸ごと置き換える（マージしない）
    pub fn restore(&mut self, serialized: &str) -> Result<(), SnapshotError> {
        let restored = snapshot::restore(serialized)?;
        self.store = restored.store;
        self.filter = restored.filter;
        self.paginator = restored.paginator;
        self.source_name = restored.source_name;
        self.data_loaded = restored.data_loaded;
        self.dirty = false;
        Ok(())
    }

    /// 全件エクスポート（フィルタ無関係）
    pub fn export<Tz>(&self, timestamp: &DateTime<Tz>) -> serde_json::Result<ExportFile>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        build_export(&self.store, self.source_name.as_deref(), timestamp)
    }

    /// 書き出し完了後に変更フラグを落とす
    pub fn mark_exported(&mut self) {
        self.dirty = false;
    }
}
