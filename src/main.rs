use anyhow::Context;
use chrono::Local;
use clap::Parser;
use jsonl_labeler::{cli, config, error, interactive, logging, render};
use cli::{Cli, Commands};
use config::Config;
use labeler_common::export::write_export;
use labeler_common::{RecordStore, Session};
use std::path::Path;

fn read_input(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        return Err(error::LabelerError::FileNotFound(path.display().to_string()).into());
    }
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let mut config = Config::load()?;

    match cli.command {
        Commands::Label { input, page_size, resume, output } => {
            println!("🔍 labeler - データ標注\n");

            let mut session = Session::new(page_size.unwrap_or(config.page_size));

            if let Some(snapshot_path) = &resume {
                let content = read_input(snapshot_path)?;
                session
                    .restore(&content)
                    .map_err(error::LabelerError::from)
                    .with_context(|| format!("restore {}", snapshot_path.display()))?;
                if let Some(size) = page_size {
                    session.set_page_size(size);
                }
                println!("✔ セッションを再開: {}件", session.store().len());
            } else if let Some(input_path) = &input {
                let content = read_input(input_path)?;
                session
                    .load(file_name_of(input_path).as_deref(), &content)
                    .map_err(error::LabelerError::from)
                    .with_context(|| format!("load {}", input_path.display()))?;
                println!("✔ {}件のデータを読み込みました", session.store().len());
            }

            let source = input.as_deref().or(resume.as_deref());
            let paths = interactive::SessionPaths {
                export_dir: output.unwrap_or_else(|| config.export_dir_for(source)),
                snapshot_path: config.default_snapshot_path(session.source_name()),
            };

            interactive::run_interactive(&mut session, &paths)?;
        }

        Commands::Stats { input } => {
            let content = read_input(&input)?;
            let mut store = RecordStore::new();
            store
                .load_str(&content)
                .map_err(error::LabelerError::from)
                .with_context(|| format!("load {}", input.display()))?;

            let stats = store.stats();
            println!("{}", render::stats_line(&stats));
            if stats.total > 0 {
                println!(
                    "進捗: {}/{} ({:.1}%)",
                    stats.labeled(),
                    stats.total,
                    stats.labeled() as f64 * 100.0 / stats.total as f64
                );
            }
        }

        Commands::Export { snapshot, output } => {
            println!("📄 labeler - エクスポート\n");

            let content = read_input(&snapshot)?;
            let mut session = Session::new(config.page_size);
            session
                .restore(&content)
                .map_err(error::LabelerError::from)
                .with_context(|| format!("restore {}", snapshot.display()))?;

            let output_dir = output.unwrap_or_else(|| config.export_dir_for(Some(&snapshot)));
            let file = session.export(&Local::now())?;
            let written = write_export(&output_dir, &file)
                .with_context(|| format!("write {}", output_dir.display()))?;
            println!("✔ {}件を書き出し: {}", session.store().len(), written.display());
        }

        Commands::Config { set_page_size, set_output_dir, set_snapshot_dir, show } => {
            let mut changed = false;

            if let Some(size) = set_page_size {
                config.set_page_size(size)?;
                changed = true;
            }
            if let Some(dir) = set_output_dir {
                config.output_dir = Some(dir);
                changed = true;
            }
            if let Some(dir) = set_snapshot_dir {
                config.snapshot_dir = Some(dir);
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  ページ件数: {}", config.page_size);
                println!(
                    "  エクスポート先: {}",
                    config
                        .output_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "入力ファイルと同じ場所".to_string())
                );
                println!(
                    "  セッション保存先: {}",
                    config
                        .snapshot_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "カレントディレクトリ".to_string())
                );
            }
        }
    }

    Ok(())
}
