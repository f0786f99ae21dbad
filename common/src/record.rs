//! レコード型定義
//!
//! JSONLの1行 = 1レコード。元のオブジェクトを丸ごと保持し、
//! エクスポート時はラベル以外を読み込んだとおりに書き戻す。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// `search_type` が無いレコードの分類値
pub const UNKNOWN_SEARCH_TYPE: &str = "Unknown";

/// 違反種別が無いレコードの分類値
pub const NO_VIOLATION: &str = "None";

/// 標注ラベル
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    #[default]
    Unlabeled,
    Pos,
    Neg,
    Disable,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::Unlabeled, Label::Pos, Label::Neg, Label::Disable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Unlabeled => "unlabeled",
            Label::Pos => "pos",
            Label::Neg => "neg",
            Label::Disable => "disable",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unlabeled" => Ok(Label::Unlabeled),
            "pos" => Ok(Label::Pos),
            "neg" => Ok(Label::Neg),
            "disable" => Ok(Label::Disable),
            _ => Err(format!(
                "Unknown label: {}. Use unlabeled, pos, neg, or disable",
                s
            )),
        }
    }
}

/// 欠落・null・空文字は `unlabeled` として読む
fn label_from_value(value: Option<&Value>) -> Result<Label, String> {
    match value {
        None | Some(Value::Null) => Ok(Label::Unlabeled),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Label::Unlabeled),
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(format!("label must be a string, got {}", other)),
    }
}

pub const LABEL_KEY: &str = "label";
pub const ITEM_ID_KEY: &str = "item_id";
pub const SEARCH_TYPE_KEY: &str = "search_type";
pub const QUERY_KEY: &str = "query";
pub const TITLE_KEY: &str = "title";
pub const IMAGE_URLS_KEY: &str = "image_urls";
pub const IMAGE_URL_KEY: &str = "image_url";
pub const IMAGE_THUMBNAIL_KEY: &str = "image_thumbnail";
pub const ANNOTATION_KEY: &str = "annotation";

/// 編集可能な注釈フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationField {
    ViolationType,
    Reason,
}

impl AnnotationField {
    pub fn key(&self) -> &'static str {
        match self {
            AnnotationField::ViolationType => "violation_type",
            AnnotationField::Reason => "reason",
        }
    }
}

impl std::fmt::Display for AnnotationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// 画像表示の候補（先頭から順に試す）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// URLまたはローカルパス
    Url(&'a str),
    /// base64埋め込みのサムネイルをデコードしたもの
    Bytes(Vec<u8>),
    /// 表示できる画像なし
    Missing,
}

/// 標注対象の1レコード
///
/// 読み込んだJSONオブジェクトをキー順・`null`・型もそのまま保持し、
/// 認識するフィールドはアクセサで読む。型が想定と違う値は
/// 「値なし」として扱うだけで、書き出し時はそのまま戻す。
/// ラベルだけは型付きで持ち、書き出し時に `label` キーの位置へ書き込む
/// （元に無ければ末尾に追加）。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Record {
    pub label: Label,
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let label = label_from_value(fields.get(LABEL_KEY))?;
        Ok(Self { label, fields })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let mut label_written = false;
        for (key, value) in &self.fields {
            if key == LABEL_KEY {
                map.serialize_entry(key, self.label.as_str())?;
                label_written = true;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        if !label_written {
            map.serialize_entry(LABEL_KEY, self.label.as_str())?;
        }
        map.end()
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

impl Record {
    /// キーと値からレコードを作る（`label` キーは解釈して取り込む）
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, String> {
        Self::try_from(fields)
    }

    /// 読み込み時の正規化
    ///
    /// `image_urls` キーが無く旧形式の `image_url` が文字列なら、1要素の配列として追加する。
    pub fn normalize(&mut self) {
        if self.fields.contains_key(IMAGE_URLS_KEY) {
            return;
        }
        if let Some(url) = self.fields.get(IMAGE_URL_KEY).and_then(Value::as_str) {
            let lifted = Value::Array(vec![Value::String(url.to_string())]);
            self.fields.insert(IMAGE_URLS_KEY.to_string(), lifted);
        }
    }

    /// 読み込んだままのキーと値（`label` の値は読み込み時点のもの）
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn item_id(&self) -> Option<&Value> {
        self.fields.get(ITEM_ID_KEY).filter(|v| !v.is_null())
    }

    /// 検索種別。文字列でなければ "Unknown"。
    pub fn search_type(&self) -> &str {
        self.fields
            .get(SEARCH_TYPE_KEY)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_SEARCH_TYPE)
    }

    pub fn query(&self) -> Option<Cow<'_, str>> {
        self.display_text(QUERY_KEY)
    }

    pub fn title(&self) -> Option<Cow<'_, str>> {
        self.display_text(TITLE_KEY)
    }

    /// 表示用の文字列。文字列以外の値はJSON表記で返す。
    pub fn display_text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// 画像URL一覧。配列中の文字列以外は無視し、
    /// `image_urls` が使えなければ `image_url` を使う。
    pub fn image_urls(&self) -> Vec<&str> {
        match self.fields.get(IMAGE_URLS_KEY) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(url)) => vec![url.as_str()],
            _ => self
                .fields
                .get(IMAGE_URL_KEY)
                .and_then(Value::as_str)
                .into_iter()
                .collect(),
        }
    }

    pub fn image_thumbnail(&self) -> Option<&str> {
        non_empty_str(self.fields.get(IMAGE_THUMBNAIL_KEY))
    }

    /// 注釈オブジェクト（オブジェクト以外の値は無いものとして扱う）
    pub fn annotation(&self) -> Option<&Map<String, Value>> {
        self.fields.get(ANNOTATION_KEY).and_then(Value::as_object)
    }

    /// 違反種別（未設定・空文字・文字列以外は "None"）
    pub fn violation_type(&self) -> &str {
        non_empty_str(
            self.annotation()
                .and_then(|a| a.get(AnnotationField::ViolationType.key())),
        )
        .unwrap_or(NO_VIOLATION)
    }

    /// 表示用ID
    pub fn display_id(&self) -> String {
        match self.item_id() {
            None => "N/A".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn annotation_field(&self, field: AnnotationField) -> Option<&str> {
        self.annotation()?.get(field.key())?.as_str()
    }

    /// 注釈フィールドを更新する。注釈が無ければ（`null` や
    /// オブジェクト以外の値も含む）新しいオブジェクトを作る。
    ///
    /// 値が変わらない場合は何もせず `false` を返す。
    pub fn set_annotation_field(&mut self, field: AnnotationField, value: &str) -> bool {
        if self.annotation_field(field) == Some(value) {
            return false;
        }
        let slot = self
            .fields
            .entry(ANNOTATION_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            tracing::warn!(previous = %slot, "replacing non-object annotation");
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(annotation) = slot {
            annotation.insert(field.key().to_string(), Value::String(value.to_string()));
        }
        true
    }

    /// 画像表示のフォールバック順: 主URL → サムネイル → 画像なし
    pub fn image_sources(&self) -> Vec<ImageSource<'_>> {
        let mut sources = Vec::with_capacity(3);
        if let Some(&url) = self.image_urls().first() {
            sources.push(ImageSource::Url(url));
        }
        if let Some(thumb) = self.image_thumbnail() {
            sources.push(thumbnail_source(thumb));
        }
        sources.push(ImageSource::Missing);
        sources
    }
}

/// `data:` URI・素のbase64はバイト列に、それ以外はURLとして扱う
fn thumbnail_source(thumb: &str) -> ImageSource<'_> {
    if let Some(rest) = thumb.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            if header.ends_with(";base64") {
                if let Ok(bytes) = STANDARD.decode(payload.trim()) {
                    return ImageSource::Bytes(bytes);
                }
            }
        }
        return ImageSource::Url(thumb);
    }

    if thumb.contains("://") {
        return ImageSource::Url(thumb);
    }

    match STANDARD.decode(thumb.trim()) {
        Ok(bytes) if !bytes.is_empty() => ImageSource::Bytes(bytes),
        _ => ImageSource::Url(thumb),
    }
}
