//! レコードストア
//!
//! レコード列の唯一の所有者。フィルタ・ページングはこのストアを参照して
//! インデックス列だけを作り、レコードのコピーは持たない。

use crate::error::{IndexError, LoadError};
use crate::record::{AnnotationField, Label, Record};
use std::collections::BTreeMap;

/// ラベル集計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    /// 全ラベルを含む（0件も含む）
    pub counts_by_label: BTreeMap<Label, usize>,
}

impl Stats {
    pub fn count(&self, label: Label) -> usize {
        self.counts_by_label.get(&label).copied().unwrap_or(0)
    }

    /// 標注済み件数（unlabeled以外）
    pub fn labeled(&self) -> usize {
        self.total - self.count(Label::Unlabeled)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 正規化済みレコードからストアを作る
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut records = records;
        records.iter_mut().for_each(Record::normalize);
        Self { records }
    }

    /// JSONL行を読み込む
    ///
    /// 空行は無視する。1行でもパースに失敗したら全体を失敗とし、
    /// 既存の内容は変更しない。
    pub fn load<I, S>(&mut self, raw_lines: I) -> Result<(), LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for (idx, line) in raw_lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            let mut record: Record =
                serde_json::from_str(line).map_err(|e| LoadError::ParseFailure {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            record.normalize();
            parsed.push(record);
        }

        tracing::info!(records = parsed.len(), "loaded records");
        self.records = parsed;
        Ok(())
    }

    /// ファイル全体の文字列から読み込む
    pub fn load_str(&mut self, content: &str) -> Result<(), LoadError> {
        self.load(content.lines())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record_mut(&mut self, index: usize) -> Result<&mut Record, IndexError> {
        let size = self.records.len();
        self.records
            .get_mut(index)
            .ok_or(IndexError::OutOfBounds { index, size })
    }

    /// ラベルを更新（他のフィールドは変更しない）
    pub fn mutate_label(&mut self, index: usize, label: Label) -> Result<(), IndexError> {
        let record = self.record_mut(index)?;
        tracing::debug!(index, from = %record.label, to = %label, "label changed");
        record.label = label;
        Ok(())
    }

    /// 注釈フィールドを更新する。値が変わったら `true`。
    pub fn mutate_annotation_field(
        &mut self,
        index: usize,
        field: AnnotationField,
        value: &str,
    ) -> Result<bool, IndexError> {
        let changed = self.record_mut(index)?.set_annotation_field(field, value);
        if changed {
            tracing::debug!(index, %field, "annotation updated");
        }
        Ok(changed)
    }

    /// 全件をJSONLに変換（フィルタに関係なく元の順序）
    pub fn export_all(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// ラベル集計（毎回計算する）
    pub fn stats(&self) -> Stats {
        let mut counts_by_label: BTreeMap<Label, usize> =
            Label::ALL.iter().map(|&label| (label, 0)).collect();
        for record in &self.records {
            *counts_by_label.entry(record.label).or_insert(0) += 1;
        }
        Stats {
            total: self.records.len(),
            counts_by_label,
        }
    }
}
