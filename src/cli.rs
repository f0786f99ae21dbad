use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "labeler")]
#[command(about = "JSONLデータ標注ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力（-v: debug, -vv: trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// JSONLを読み込んで対話的に標注する
    Label {
        /// 入力JSONLファイル
        #[arg(required_unless_present = "resume")]
        input: Option<PathBuf>,

        /// 1ページの表示件数（省略時は設定値）
        #[arg(short, long)]
        page_size: Option<usize>,

        /// 保存したセッションから再開
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// エクスポート先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ラベルの集計を表示
    Stats {
        /// 入力JSONLファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 保存したセッションを標注済みJSONLとして書き出す
    Export {
        /// セッションファイル
        #[arg(required = true)]
        snapshot: PathBuf,

        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 1ページの表示件数を設定
        #[arg(long)]
        set_page_size: Option<usize>,

        /// エクスポート先ディレクトリを設定
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// セッション保存先ディレクトリを設定
        #[arg(long)]
        set_snapshot_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
