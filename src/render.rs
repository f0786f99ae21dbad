//! 端末向けの表示

use labeler_common::{AnnotationField, FilterSpec, ImageSource, Label, PageView, Record, Stats};

fn label_mark(label: Label) -> &'static str {
    match label {
        Label::Pos => "✅ POS",
        Label::Neg => "❌ NEG",
        Label::Disable => "🚫 DISABLE",
        Label::Unlabeled => "🔵 UNLABELED",
    }
}

/// 画像欄: フォールバック順の先頭を表示し、残りは予備として併記
fn image_line(record: &Record) -> String {
    let sources = record.image_sources();
    let describe = |source: &ImageSource<'_>| match source {
        ImageSource::Url(url) => url.to_string(),
        ImageSource::Bytes(bytes) => format!("<埋め込みサムネイル {} bytes>", bytes.len()),
        ImageSource::Missing => "No Image".to_string(),
    };
    match sources.split_first() {
        Some((first, rest)) if rest.len() > 1 => {
            format!("{} (予備: {})", describe(first), describe(&rest[0]))
        }
        Some((first, _)) => describe(first),
        None => "No Image".to_string(),
    }
}

/// 1レコード分のカード
pub fn record_card(index: usize, record: &Record) -> String {
    let mut lines = vec![
        format!("[{}] Item ID: {}  {}", index + 1, record.display_id(), label_mark(record.label)),
        format!("    Search Type: {}", record.search_type()),
        format!("    Query: {}", record.query().as_deref().unwrap_or("-")),
        format!("    Title: {}", record.title().as_deref().unwrap_or("-")),
        format!("    Image: {}", image_line(record)),
    ];
    if record.annotation().is_some() {
        lines.push(format!(
            "    Violation: {}  Reason: {}",
            record.violation_type(),
            record
                .annotation_field(AnnotationField::Reason)
                .unwrap_or("-")
        ));
    }
    lines.join("\n")
}

pub fn stats_line(stats: &Stats) -> String {
    format!(
        "総数: {}  ✅ Pos: {}  ❌ Neg: {}  🚫 Disable: {}  未標注: {}",
        stats.total,
        stats.count(Label::Pos),
        stats.count(Label::Neg),
        stats.count(Label::Disable),
        stats.count(Label::Unlabeled),
    )
}

pub fn filter_line(filter: &FilterSpec) -> String {
    let search_types: Vec<&str> = filter.search_types.iter().map(String::as_str).collect();
    format!(
        "絞り込み: status={} search=[{}] violation={} range={}..={}",
        filter.status,
        search_types.join(","),
        filter.violation_type,
        filter.id_range.low,
        filter.id_range.high,
    )
}

pub fn page_header(view: &PageView) -> String {
    format!(
        "--- ページ {}/{}（該当 {}件）---",
        view.page, view.total_pages, view.filtered_count
    )
}
