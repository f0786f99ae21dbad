//! `tracing` によるログ設定
//!
//! 利用者向けの進捗表示は `println!`、診断ログは `tracing` に出す。
//! ログは標準エラーへ。`RUST_LOG` があればそちらを優先する。

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `-v` の回数からログレベルを決める
///
/// - 0: warn（対話画面を邪魔しない）
/// - 1: debug
/// - 2以上: trace
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,jsonl_labeler={level},labeler={level},labeler_common={level}"
        ))
    })
}

/// ログを初期化する（二重初期化はエラーにせず無視）
pub fn init_logging(verbosity: u8) {
    let filter = build_env_filter(level_from_verbosity(verbosity));
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0), Level::WARN);
        assert_eq!(level_from_verbosity(1), Level::DEBUG);
        assert_eq!(level_from_verbosity(5), Level::TRACE);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(0);
        init_logging(1);
    }
}
