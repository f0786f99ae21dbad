//! フィルタ条件と適用
//!
//! 4つの条件（ラベル状態・検索タイプ・違反種別・位置ID範囲）のAND。
//! 結果は元のインデックスの昇順リストで、レコード自体はコピーしない。

use crate::record::{Label, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// ラベル状態の条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Label),
}

impl StatusFilter {
    fn matches(&self, label: Label) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == label,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "All"),
            StatusFilter::Only(label) => write!(f, "{}", label),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// 違反種別の条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViolationFilter {
    #[default]
    All,
    Only(String),
}

impl ViolationFilter {
    fn matches(&self, violation_type: &str) -> bool {
        match self {
            ViolationFilter::All => true,
            ViolationFilter::Only(wanted) => wanted == violation_type,
        }
    }
}

impl std::fmt::Display for ViolationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationFilter::All => write!(f, "All"),
            ViolationFilter::Only(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for ViolationFilter {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("all") {
            ViolationFilter::All
        } else {
            ViolationFilter::Only(value.trim().to_string())
        }
    }
}

/// 位置ID（1始まり）の閉区間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub low: usize,
    pub high: usize,
}

impl IdRange {
    pub fn new(low: usize, high: usize) -> Self {
        Self { low, high }
    }

    /// 全件を含む範囲
    pub fn full(record_count: usize) -> Self {
        Self::new(1, record_count.max(1))
    }

    /// `[1, record_count]` に収める。逆順なら入れ替える。
    pub fn clamped(self, record_count: usize) -> Self {
        let max = record_count.max(1);
        let low = self.low.clamp(1, max);
        let high = self.high.clamp(1, max);
        if low <= high {
            Self::new(low, high)
        } else {
            Self::new(high, low)
        }
    }

    pub fn contains(&self, id: usize) -> bool {
        self.low <= id && id <= self.high
    }
}

/// 複合フィルタ条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub status: StatusFilter,
    pub search_types: BTreeSet<String>,
    pub violation_type: ViolationFilter,
    pub id_range: IdRange,
}

impl FilterSpec {
    /// 何も絞り込まない条件
    pub fn for_records(records: &[Record]) -> Self {
        Self {
            status: StatusFilter::All,
            search_types: known_search_types(records).into_iter().collect(),
            violation_type: ViolationFilter::All,
            id_range: IdRange::full(records.len()),
        }
    }

    /// 現在のデータに合わせて条件を補正する
    ///
    /// - ID範囲を `[1, 件数]` に収める
    /// - データに存在しない検索タイプを含む場合は全検索タイプに戻す
    pub fn reconcile(&mut self, records: &[Record]) {
        self.id_range = self.id_range.clamped(records.len());

        let known: BTreeSet<String> = known_search_types(records).into_iter().collect();
        if !self.search_types.is_subset(&known) {
            tracing::debug!(
                selected = self.search_types.len(),
                known = known.len(),
                "stale search types, falling back to all"
            );
            self.search_types = known;
        }
    }

    /// 絞り込みが無い状態か
    pub fn is_unrestricted(&self, records: &[Record]) -> bool {
        *self == Self::for_records(records)
    }

    /// 1件が全条件を満たすか（`index` は0始まりの位置）
    pub fn matches(&self, index: usize, record: &Record) -> bool {
        self.status.matches(record.label)
            && self.search_types.contains(record.search_type())
            && self.violation_type.matches(record.violation_type())
            && self.id_range.contains(index + 1)
    }
}

/// 条件を満たすレコードの元インデックス（昇順）
pub fn apply(records: &[Record], spec: &FilterSpec) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(idx, record)| spec.matches(*idx, record))
        .map(|(idx, _)| idx)
        .collect()
}

/// データ中の検索タイプ一覧（重複除去・ソート済み）
pub fn known_search_types(records: &[Record]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().map(Record::search_type).collect();
    set.into_iter().map(str::to_string).collect()
}

/// データ中の違反種別一覧（"None" を含む）
pub fn known_violation_types(records: &[Record]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().map(Record::violation_type).collect();
    set.into_iter().map(str::to_string).collect()
}
