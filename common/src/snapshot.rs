//! セッションスナップショット
//!
//! レコード全件 + フィルタ + ページ状態を1つのJSONドキュメントに保存し、
//! 復元時は現在の状態を丸ごと置き換える。
//!
//! ```json
//! {"data": [...], "dataLoaded": true, "filterState": {...}, "sourceName": "batch.jsonl"}
//! ```
//!
//! 復元は寛容: `data` 以外のキーは欠けていても型が違っていても、
//! その項目だけ既定値で補う。

use crate::error::SnapshotError;
use crate::filter::{FilterSpec, IdRange, StatusFilter, ViolationFilter};
use crate::paginator::{Paginator, DEFAULT_PAGE_SIZE};
use crate::record::Record;
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DATA_KEY: &str = "data";
const DATA_LOADED_KEY: &str = "dataLoaded";
const FILTER_STATE_KEY: &str = "filterState";
const SOURCE_NAME_KEY: &str = "sourceName";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument<'a> {
    data: &'a [Record],
    data_loaded: bool,
    filter_state: FilterStateDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_name: Option<&'a str>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterStateDocument {
    status: Option<String>,
    search_types: Option<Vec<String>>,
    violation_type: Option<String>,
    id_range: Option<(usize, usize)>,
    page_size: Option<usize>,
    current_page: Option<usize>,
}

/// 任意項目を読む。`null` は未指定、型が合わない値は警告して未指定扱い。
fn optional_field<'a, T>(
    object: &'a Map<String, Value>,
    key: &str,
    read: impl FnOnce(&'a Value) -> Option<T>,
) -> Option<T> {
    let value = object.get(key).filter(|v| !v.is_null())?;
    let parsed = read(value);
    if parsed.is_none() {
        tracing::warn!(key, %value, "ignoring invalid snapshot field");
    }
    parsed
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn as_range(value: &Value) -> Option<(usize, usize)> {
    match value.as_array()?.as_slice() {
        [low, high] => Some((as_usize(low)?, as_usize(high)?)),
        _ => None,
    }
}

impl FilterStateDocument {
    fn from_state(filter: &FilterSpec, paginator: &Paginator) -> Self {
        Self {
            status: Some(filter.status.to_string()),
            search_types: Some(filter.search_types.iter().cloned().collect()),
            violation_type: Some(filter.violation_type.to_string()),
            id_range: Some((filter.id_range.low, filter.id_range.high)),
            page_size: Some(paginator.page_size()),
            current_page: Some(paginator.current_page()),
        }
    }

    /// 項目ごとに読み、読めない項目だけ既定値に戻す
    fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Self::default();
        };
        let Some(object) = value.as_object() else {
            tracing::warn!(%value, "filterState is not an object, using defaults");
            return Self::default();
        };
        Self {
            status: optional_field(object, "status", |v| v.as_str().map(str::to_string)),
            search_types: optional_field(object, "searchTypes", as_string_list),
            violation_type: optional_field(object, "violationType", |v| {
                v.as_str().map(str::to_string)
            }),
            id_range: optional_field(object, "idRange", as_range),
            page_size: optional_field(object, "pageSize", |v| as_usize(v).filter(|&n| n > 0)),
            current_page: optional_field(object, "currentPage", as_usize),
        }
    }

    /// 欠けている項目は「絞り込みなし」の値で補う
    fn into_state(self, records: &[Record]) -> (FilterSpec, Paginator) {
        let mut filter = FilterSpec::for_records(records);

        if let Some(status) = self.status {
            match status.parse::<StatusFilter>() {
                Ok(parsed) => filter.status = parsed,
                Err(e) => tracing::warn!(%status, error = %e, "unknown status in snapshot, using All"),
            }
        }
        if let Some(search_types) = self.search_types {
            filter.search_types = search_types.into_iter().collect();
        }
        if let Some(violation_type) = self.violation_type {
            filter.violation_type = ViolationFilter::from(violation_type.as_str());
        }
        if let Some((low, high)) = self.id_range {
            filter.id_range = IdRange::new(low, high);
        }
        filter.reconcile(records);

        let mut paginator = Paginator::new(self.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        let filtered_count = crate::filter::apply(records, &filter).len();
        paginator.go_to(self.current_page.unwrap_or(1), filtered_count);

        (filter, paginator)
    }
}

/// 復元されたセッション状態
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub store: RecordStore,
    pub filter: FilterSpec,
    pub paginator: Paginator,
    pub data_loaded: bool,
    pub source_name: Option<String>,
}

/// スナップショットをJSON文字列にする
pub fn save(
    store: &RecordStore,
    filter: &FilterSpec,
    paginator: &Paginator,
) -> serde_json::Result<String> {
    save_with_source(store, filter, paginator, None)
}

/// 元ファイル名付きで保存（エクスポート名の復元用）
pub fn save_with_source(
    store: &RecordStore,
    filter: &FilterSpec,
    paginator: &Paginator,
    source_name: Option<&str>,
) -> serde_json::Result<String> {
    let document = SnapshotDocument {
        data: store.records(),
        data_loaded: !store.is_empty(),
        filter_state: FilterStateDocument::from_state(filter, paginator),
        source_name,
    };
    serde_json::to_string_pretty(&document)
}

/// JSON文字列からスナップショットを復元する
pub fn restore(serialized: &str) -> Result<SessionSnapshot, SnapshotError> {
    let value: Value =
        serde_json::from_str(serialized).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(SnapshotError::Malformed(
            "top level must be a JSON object".to_string(),
        ));
    };
    let records = match object.get(DATA_KEY) {
        None => return Err(SnapshotError::MissingKey(DATA_KEY)),
        Some(Value::Null) => Vec::new(),
        Some(data) => Vec::<Record>::deserialize(data)
            .map_err(|e| SnapshotError::Malformed(e.to_string()))?,
    };

    let store = RecordStore::from_records(records);
    let (filter, paginator) =
        FilterStateDocument::from_value(object.get(FILTER_STATE_KEY)).into_state(store.records());
    let data_loaded = optional_field(object, DATA_LOADED_KEY, Value::as_bool);
    let source_name = optional_field(object, SOURCE_NAME_KEY, |v| v.as_str().map(str::to_string));

    tracing::info!(
        records = store.len(),
        page = paginator.current_page(),
        "restored session snapshot"
    );

    Ok(SessionSnapshot {
        data_loaded: data_loaded.unwrap_or(!store.is_empty()),
        source_name,
        store,
        filter,
        paginator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply;
    use crate::record::Label;

    fn store() -> RecordStore {
        let mut store = RecordStore::new();
        store
            .load_str(
                r#"{"item_id":1,"search_type":"A","extra_key":"keep"}
{"item_id":2,"search_type":"B","label":"pos"}
{"item_id":3,"search_type":"A","label":"pos"}
{"item_id":4,"search_type":"B"}"#,
            )
            .unwrap();
        store
    }

    #[test]
    fn test_save_and_restore() {
        let store = store();
        let mut filter = FilterSpec::for_records(store.records());
        filter.status = StatusFilter::Only(Label::Pos);
        filter.id_range = IdRange::new(2, 4);
        let mut paginator = Paginator::new(1);
        paginator.go_to(2, apply(store.records(), &filter).len());

        let json = save_with_source(&store, &filter, &paginator, Some("batch.jsonl")).unwrap();
        let restored = restore(&json).unwrap();

        assert_eq!(restored.store.export_all().unwrap(), store.export_all().unwrap());
        assert_eq!(restored.filter, filter);
        assert_eq!(restored.paginator, paginator);
        assert!(restored.data_loaded);
        assert_eq!(restored.source_name.as_deref(), Some("batch.jsonl"));
    }

    #[test]
    fn test_document_shape() {
        let store = store();
        let filter = FilterSpec::for_records(store.records());
        let json = save(&store, &filter, &Paginator::default()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert!(value["data"].is_array());
        assert_eq!(value["dataLoaded"], Value::Bool(true));
        assert_eq!(value["filterState"]["status"], "All");
        assert_eq!(value["filterState"]["idRange"], serde_json::json!([1, 4]));
        assert_eq!(value["filterState"]["pageSize"], 10);
        assert!(value.get("sourceName").is_none());
    }

    #[test]
    fn test_restore_only_data_uses_defaults() {
        let restored = restore(r#"{"data":[{"item_id":1},{"item_id":2,"label":"neg"}]}"#).unwrap();
        assert_eq!(restored.store.len(), 2);
        assert!(restored.filter.is_unrestricted(restored.store.records()));
        assert_eq!(restored.paginator.current_page(), 1);
        assert_eq!(restored.paginator.page_size(), DEFAULT_PAGE_SIZE);
        assert!(restored.data_loaded);
    }

    #[test]
    fn test_restore_null_data_is_empty() {
        let restored = restore(r#"{"data":null}"#).unwrap();
        assert!(restored.store.is_empty());
        assert!(!restored.data_loaded);
    }

    #[test]
    fn test_restore_missing_data_key() {
        let err = restore(r#"{"dataLoaded":true,"filterState":{}}"#).unwrap_err();
        assert_eq!(err, SnapshotError::MissingKey("data"));
    }

    #[test]
    fn test_restore_malformed() {
        assert!(matches!(restore("{oops"), Err(SnapshotError::Malformed(_))));
        assert!(matches!(restore("[1,2]"), Err(SnapshotError::Malformed(_))));
        assert!(matches!(
            restore(r#"{"data":[{"label":"bogus"}]}"#),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn test_restore_clamps_out_of_range_state() {
        let restored = restore(
            r#"{"data":[{"search_type":"A"},{"search_type":"A"}],
                "filterState":{"searchTypes":["Z"],"idRange":[0,99],"pageSize":1,"currentPage":50}}"#,
        )
        .unwrap();
        assert_eq!(restored.filter.id_range, IdRange::new(1, 2));
        assert!(restored.filter.search_types.contains("A"));
        assert_eq!(restored.paginator.current_page(), 2);
    }

    #[test]
    fn test_restore_invalid_fields_fall_back_individually() {
        let restored = restore(
            r#"{"data":[{"item_id":1},{"item_id":2,"label":"pos"}],
                "dataLoaded":"yes",
                "sourceName":7,
                "filterState":{"status":"pos","currentPage":-1,"pageSize":"10","idRange":[1],"searchTypes":[1,2]}}"#,
        )
        .unwrap();
        assert_eq!(restored.filter.status, StatusFilter::Only(Label::Pos));
        assert_eq!(restored.paginator.current_page(), 1);
        assert_eq!(restored.paginator.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(restored.filter.id_range, IdRange::new(1, 2));
        assert!(restored.filter.search_types.contains("Unknown"));
        assert!(restored.data_loaded);
        assert!(restored.source_name.is_none());
    }

    #[test]
    fn test_restore_zero_page_size_falls_back() {
        let restored = restore(r#"{"data":[],"filterState":{"pageSize":0}}"#).unwrap();
        assert_eq!(restored.paginator.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_restore_non_object_filter_state() {
        let restored = restore(r#"{"data":[{"item_id":1}],"filterState":"broken"}"#).unwrap();
        assert!(restored.filter.is_unrestricted(restored.store.records()));
    }

    #[test]
    fn test_restore_unknown_status_falls_back() {
        let restored = restore(r#"{"data":[],"filterState":{"status":"weird"}}"#).unwrap();
        assert_eq!(restored.filter.status, StatusFilter::All);
    }

    #[test]
    fn test_restore_normalizes_records() {
        let restored = restore(r#"{"data":[{"image_url":"a.jpg","label":""}]}"#).unwrap();
        let record = restored.store.get(0).unwrap();
        assert_eq!(record.label, Label::Unlabeled);
        assert_eq!(record.image_urls(), vec!["a.jpg"]);
    }
}
