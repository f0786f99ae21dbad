//! 標注ワークフローテスト
//!
//! 読み込み → 絞り込み → 標注 → 保存・再開 → 書き出し の一連の流れを検証

use chrono::{Local, TimeZone};
use jsonl_labeler::command::parse_command;
use jsonl_labeler::interactive::{apply_command, save_snapshot, SessionPaths};
use labeler_common::{AnnotationField, Label, RecordStore, Session, StatusFilter};
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

fn write_input(dir: &Path) -> std::path::PathBuf {
    let lines: Vec<String> = (1..=25)
        .map(|i| {
            let search_type = if i % 2 == 0 { "image" } else { "text" };
            let label = if i % 5 == 0 { r#","label":"pos""# } else { "" };
            format!(
                r#"{{"item_id":"sku-{i}","search_type":"{search_type}","query":"q{i}","image_url":"http://img/{i}.jpg","vendor":{{"rank":{i}}}{label}}}"#
            )
        })
        .collect();
    let path = dir.join("listings.jsonl");
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn run(session: &mut Session, paths: &SessionPaths, input: &str) {
    apply_command(session, parse_command(input).unwrap(), paths).unwrap();
}

#[test]
fn test_full_labeling_workflow() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_input(dir.path());
    let paths = SessionPaths {
        export_dir: dir.path().join("exports"),
        snapshot_path: dir.path().join("listings.session.json"),
    };

    let mut session = Session::new(10);
    let content = std::fs::read_to_string(&input).unwrap();
    session.load(Some("listings.jsonl"), &content).unwrap();
    assert_eq!(session.stats().count(Label::Pos), 5);

    // 未標注の image のみ
    run(&mut session, &paths, "status unlabeled");
    run(&mut session, &paths, "search image");
    let view = session.view();
    assert_eq!(view.filtered_count, 10);
    assert_eq!(view.items[0], 1);

    run(&mut session, &paths, "g 2");
    assert_eq!(session.view().page, 1);

    // 標注すると絞り込みから外れる
    run(&mut session, &paths, "2 neg");
    run(&mut session, &paths, "v 4 watermark");
    run(&mut session, &paths, "r 4 logo in corner");
    assert_eq!(session.view().filtered_count, 9);
    assert!(session.is_dirty());

    save_snapshot(&session, &paths.snapshot_path).unwrap();

    // 別のセッションで再開
    let mut resumed = Session::new(3);
    let saved = std::fs::read_to_string(&paths.snapshot_path).unwrap();
    resumed.restore(&saved).unwrap();
    assert_eq!(resumed.filter().status, StatusFilter::Only(Label::Unlabeled));
    assert_eq!(resumed.paginator().page_size(), 10);
    assert_eq!(resumed.view().filtered_count, 9);
    assert_eq!(resumed.record(1).unwrap().label, Label::Neg);
    assert_eq!(
        resumed.record(3).unwrap().annotation_field(AnnotationField::Reason),
        Some("logo in corner")
    );

    // 書き出しは絞り込みに関係なく全件
    run(&mut resumed, &paths, "export");
    let exported: Vec<_> = std::fs::read_dir(&paths.export_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(exported.len(), 1);
    let name = exported[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("listings_"));
    assert!(name.ends_with("_labeled_data.jsonl"));

    let text = std::fs::read_to_string(&exported[0]).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 25);
    assert_eq!(lines[1]["label"], "neg");
    assert_eq!(lines[0]["label"], "unlabeled");
    assert_eq!(lines[3]["annotation"]["violation_type"], "watermark");
    assert_eq!(lines[3]["vendor"]["rank"], 4);
    assert_eq!(lines[3]["image_urls"], serde_json::json!(["http://img/4.jpg"]));
    assert_eq!(lines[3]["image_url"], "http://img/4.jpg");
}

#[test]
fn test_export_round_trip_through_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_input(dir.path());

    let mut session = Session::default();
    session
        .load(Some("listings.jsonl"), &std::fs::read_to_string(&input).unwrap())
        .unwrap();
    session.set_label(7, Label::Disable).unwrap();

    let timestamp = Local.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let file = session.export(&timestamp).unwrap();
    assert_eq!(file.file_name, "listings_20260301_120000_labeled_data.jsonl");

    let mut reloaded = RecordStore::new();
    reloaded.load_str(&file.content).unwrap();
    assert_eq!(reloaded.export_all().unwrap(), file.content);
    assert_eq!(reloaded.get(7).unwrap().label, Label::Disable);
}

/// 型の違う値や null を含むファイルもそのまま書き戻される
#[test]
fn test_irregular_fields_survive_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("irregular.jsonl");
    let content = r#"{"item_id":1,"title":123,"query":null}
{"query":["a","b"],"item_id":null,"annotation":null,"label":"pos"}
"#;
    std::fs::write(&input, content).unwrap();

    let mut session = Session::default();
    session
        .load(Some("irregular.jsonl"), &std::fs::read_to_string(&input).unwrap())
        .unwrap();
    session
        .set_annotation_field(1, AnnotationField::Reason, "dup")
        .unwrap();

    let timestamp = Local.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let file = session.export(&timestamp).unwrap();
    let lines: Vec<&str> = file.content.lines().collect();
    assert_eq!(
        lines[0],
        r#"{"item_id":1,"title":123,"query":null,"label":"unlabeled"}"#
    );
    assert_eq!(
        lines[1],
        r#"{"query":["a","b"],"item_id":null,"annotation":{"reason":"dup"},"label":"pos"}"#
    );
}
