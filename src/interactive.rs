//! 対話式標注モジュール
//!
//! 1行ずつコマンドを受け取り、セッションを更新して現在ページを再表示する。
//! 表示は毎回セッションから計算し直す。

use crate::command::{parse_command, SearchSelection, SessionCommand, HELP};
use crate::error::{LabelerError, Result};
use crate::render;
use chrono::Local;
use dialoguer::{Confirm, Input};
use labeler_common::export::write_export;
use labeler_common::Session;
use std::path::{Path, PathBuf};

/// 保存・書き出し先
#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub export_dir: PathBuf,
    pub snapshot_path: PathBuf,
}

/// コマンド実行の結果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    pub message: Option<String>,
    pub quit: bool,
}

impl CommandOutcome {
    fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            quit: false,
        }
    }
}

/// 1コマンドをセッションに適用する
pub fn apply_command(
    session: &mut Session,
    command: SessionCommand,
    paths: &SessionPaths,
) -> Result<CommandOutcome> {
    let outcome = match command {
        SessionCommand::Refresh => CommandOutcome::default(),
        SessionCommand::NextPage => {
            session.next_page();
            CommandOutcome::default()
        }
        SessionCommand::PreviousPage => {
            session.previous_page();
            CommandOutcome::default()
        }
        SessionCommand::GoToPage(page) => {
            session.go_to_page(page);
            CommandOutcome::default()
        }
        SessionCommand::SetLabel { id, label } => {
            let Some(index) = id.checked_sub(1) else {
                return Ok(CommandOutcome::message("⚠ IDは1以上です"));
            };
            match session.set_label(index, label) {
                Ok(()) => CommandOutcome::message(format!("  → [{}] {}", id, label)),
                Err(e) => CommandOutcome::message(format!("⚠ {}", e)),
            }
        }
        SessionCommand::SetAnnotation { id, field, value } => {
            let Some(index) = id.checked_sub(1) else {
                return Ok(CommandOutcome::message("⚠ IDは1以上です"));
            };
            match session.set_annotation_field(index, field, &value) {
                Ok(true) => CommandOutcome::message(format!("  → [{}] {} = {}", id, field, value)),
                Ok(false) => CommandOutcome::message(format!("  → [{}] 変更なし", id)),
                Err(e) => CommandOutcome::message(format!("⚠ {}", e)),
            }
        }
        SessionCommand::Status(status) => {
            let mut spec = session.filter().clone();
            spec.status = status;
            session.set_filter(spec);
            CommandOutcome::default()
        }
        SessionCommand::SearchTypes(selection) => {
            let mut spec = session.filter().clone();
            spec.search_types = match selection {
                SearchSelection::All => {
                    labeler_common::filter::known_search_types(session.store().records())
                        .into_iter()
                        .collect()
                }
                SearchSelection::Only(values) => values.into_iter().collect(),
            };
            session.set_filter(spec);
            CommandOutcome::default()
        }
        SessionCommand::Violation(violation) => {
            let mut spec = session.filter().clone();
            spec.violation_type = violation;
            session.set_filter(spec);
            CommandOutcome::default()
        }
        SessionCommand::Range { low, high } => {
            let mut spec = session.filter().clone();
            spec.id_range = labeler_common::IdRange::new(low, high);
            session.set_filter(spec);
            CommandOutcome::default()
        }
        SessionCommand::ResetFilter => {
            session.reset_filter();
            CommandOutcome::message("絞り込みを解除しました")
        }
        SessionCommand::PageSize(size) => {
            session.set_page_size(size);
            CommandOutcome::default()
        }
        SessionCommand::Stats => CommandOutcome::message(render::stats_line(&session.stats())),
        SessionCommand::Save(path) => {
            let path = path.unwrap_or_else(|| paths.snapshot_path.clone());
            save_snapshot(session, &path)?;
            CommandOutcome::message(format!("✔ セッションを保存: {}", path.display()))
        }
        SessionCommand::Export => {
            let file = session.export(&Local::now())?;
            let written = write_export(&paths.export_dir, &file)?;
            session.mark_exported();
            CommandOutcome::message(format!(
                "✔ {}件を書き出し: {}",
                session.store().len(),
                written.display()
            ))
        }
        SessionCommand::Help => CommandOutcome::message(HELP),
        SessionCommand::Quit => CommandOutcome {
            message: None,
            quit: true,
        },
    };
    Ok(outcome)
}

/// セッションをファイルに保存
pub fn save_snapshot(session: &Session, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = session.snapshot()?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "saved session snapshot");
    Ok(())
}

/// 現在の画面を組み立てる
pub fn render_screen(session: &mut Session) -> String {
    let view = session.view();
    let mut out = vec![
        render::stats_line(&session.stats()),
        render::filter_line(session.filter()),
        render::page_header(&view),
    ];
    if view.items.is_empty() {
        out.push("⚠ 条件に該当するデータがありません".to_string());
    }
    for &index in &view.items {
        if let Some(record) = session.record(index) {
            out.push(render::record_card(index, record));
        }
    }
    out.join("\n")
}

/// 対話ループ
pub fn run_interactive(session: &mut Session, paths: &SessionPaths) -> Result<()> {
    println!("📝 標注開始: {}件", session.store().len());
    println!("help で操作一覧を表示\n");

    loop {
        println!("{}\n", render_screen(session));

        let input: String = Input::new()
            .with_prompt("コマンド")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| LabelerError::Prompt(e.to_string()))?;

        let command = match parse_command(&input) {
            Ok(command) => command,
            Err(message) => {
                println!("⚠ {}\n", message);
                continue;
            }
        };

        let outcome = match apply_command(session, command, paths) {
            Ok(outcome) => outcome,
            Err(e) => {
                // 保存・書き出しの失敗は状態を変えずに続行
                println!("⚠ {}\n", e);
                continue;
            }
        };
        if let Some(message) = &outcome.message {
            println!("{}\n", message);
        }

        if outcome.quit {
            if session.is_dirty() && confirm_export()? && !export_before_quit(session, paths) {
                continue;
            }
            println!("終了します");
            break;
        }
    }

    Ok(())
}

/// 終了前の書き出し。失敗したら `false` を返し、終了を取りやめる。
pub fn export_before_quit(session: &mut Session, paths: &SessionPaths) -> bool {
    match apply_command(session, SessionCommand::Export, paths) {
        Ok(outcome) => {
            if let Some(message) = outcome.message {
                println!("{}", message);
            }
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "export before quit failed");
            println!("⚠ {}\n終了を中止しました。保存先を確認してください\n", e);
            false
        }
    }
}

fn confirm_export() -> Result<bool> {
    Confirm::new()
        .with_prompt("未書き出しの変更があります。書き出しますか？")
        .default(true)
        .interact()
        .map_err(|e| LabelerError::Prompt(e.to_string()))
}
