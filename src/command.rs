//! 対話モードのコマンド解析

use labeler_common::{AnnotationField, Label, StatusFilter, ViolationFilter};
use std::path::PathBuf;

/// 検索タイプの選択
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSelection {
    All,
    Only(Vec<String>),
}

/// 対話コマンド
///
/// レコードは表示中の位置ID（1始まり）で指定する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// 再表示
    Refresh,
    NextPage,
    PreviousPage,
    GoToPage(usize),
    SetLabel { id: usize, label: Label },
    SetAnnotation { id: usize, field: AnnotationField, value: String },
    Status(StatusFilter),
    SearchTypes(SearchSelection),
    Violation(ViolationFilter),
    Range { low: usize, high: usize },
    ResetFilter,
    PageSize(usize),
    Stats,
    Save(Option<PathBuf>),
    Export,
    Help,
    Quit,
}

pub const HELP: &str = "\
操作:
  n / p                 次ページ / 前ページ
  g <ページ>            ページ移動
  <ID> <pos|neg|disable|unlabeled>   ラベル設定（p/n/d/u も可）
  v <ID> <テキスト>     違反種別を設定
  r <ID> <テキスト>     理由を設定
  status <all|ラベル>   ラベル状態で絞り込み
  search <all|A,B,...>  検索タイプで絞り込み
  violation <all|種別>  違反種別で絞り込み
  range <下限> <上限>   位置IDの範囲で絞り込み
  reset                 絞り込み解除
  size <件数>           1ページの件数
  stats                 集計表示
  save [パス]           セッション保存
  export                標注結果を書き出し
  help                  この表示
  q                     終了";

fn parse_number(token: &str, what: &str) -> Result<usize, String> {
    token
        .parse::<usize>()
        .map_err(|_| format!("{}は数値で指定してください: {}", what, token))
}

fn parse_id(token: &str) -> Result<usize, String> {
    let id = parse_number(token, "ID")?;
    if id == 0 {
        return Err("IDは1以上です".to_string());
    }
    Ok(id)
}

fn parse_label_arg(token: &str) -> Result<Label, String> {
    match token {
        "p" => Ok(Label::Pos),
        "n" => Ok(Label::Neg),
        "d" => Ok(Label::Disable),
        "u" => Ok(Label::Unlabeled),
        other => other.parse(),
    }
}

/// 1行の入力をコマンドにする
pub fn parse_command(input: &str) -> Result<SessionCommand, String> {
    let input = input.trim();
    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };

    match head {
        "" => Ok(SessionCommand::Refresh),
        "n" | "next" if rest.is_empty() => Ok(SessionCommand::NextPage),
        "p" | "prev" if rest.is_empty() => Ok(SessionCommand::PreviousPage),
        "q" | "quit" | "exit" => Ok(SessionCommand::Quit),
        "help" | "h" | "?" => Ok(SessionCommand::Help),
        "stats" => Ok(SessionCommand::Stats),
        "export" | "e" => Ok(SessionCommand::Export),
        "reset" => Ok(SessionCommand::ResetFilter),
        "save" | "s" => Ok(SessionCommand::Save(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        )),
        "g" | "go" => Ok(SessionCommand::GoToPage(parse_number(rest, "ページ")?)),
        "size" => {
            let size = parse_number(rest, "件数")?;
            if size == 0 {
                return Err("件数は1以上です".to_string());
            }
            Ok(SessionCommand::PageSize(size))
        }
        "status" => Ok(SessionCommand::Status(rest.parse()?)),
        "violation" => {
            if rest.is_empty() {
                return Err("違反種別を指定してください".to_string());
            }
            Ok(SessionCommand::Violation(ViolationFilter::from(rest)))
        }
        "search" => {
            if rest.eq_ignore_ascii_case("all") {
                return Ok(SessionCommand::SearchTypes(SearchSelection::All));
            }
            let values: Vec<String> = rest
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            if values.is_empty() {
                return Err("検索種別を指定してください（全種別は search all）".to_string());
            }
            Ok(SessionCommand::SearchTypes(SearchSelection::Only(values)))
        }
        "range" => {
            let mut parts = rest.split_whitespace();
            let (Some(low), Some(high), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err("range <下限> <上限> の形式で指定してください".to_string());
            };
            Ok(SessionCommand::Range {
                low: parse_number(low, "下限")?,
                high: parse_number(high, "上限")?,
            })
        }
        "v" | "r" => {
            let field = if head == "v" {
                AnnotationField::ViolationType
            } else {
                AnnotationField::Reason
            };
            let Some((id, value)) = rest.split_once(char::is_whitespace) else {
                return Err(format!("{} <ID> <テキスト> の形式で指定してください", head));
            };
            Ok(SessionCommand::SetAnnotation {
                id: parse_id(id)?,
                field,
                value: value.trim().to_string(),
            })
        }
        id if id.chars().all(|c| c.is_ascii_digit()) => {
            if rest.is_empty() {
                return Err(format!("ラベルを指定してください: {} pos", id));
            }
            Ok(SessionCommand::SetLabel {
                id: parse_id(id)?,
                label: parse_label_arg(rest)?,
            })
        }
        _ => Err(format!("不明なコマンド: {}（help で一覧）", input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation() {
        assert_eq!(parse_command(""), Ok(SessionCommand::Refresh));
        assert_eq!(parse_command(" n "), Ok(SessionCommand::NextPage));
        assert_eq!(parse_command("p"), Ok(SessionCommand::PreviousPage));
        assert_eq!(parse_command("g 4"), Ok(SessionCommand::GoToPage(4)));
        assert!(parse_command("g four").is_err());
    }

    #[test]
    fn test_set_label() {
        assert_eq!(
            parse_command("12 pos"),
            Ok(SessionCommand::SetLabel { id: 12, label: Label::Pos })
        );
        assert_eq!(
            parse_command("3 d"),
            Ok(SessionCommand::SetLabel { id: 3, label: Label::Disable })
        );
        assert!(parse_command("0 pos").is_err());
        assert!(parse_command("5").is_err());
        assert!(parse_command("5 maybe").is_err());
    }

    #[test]
    fn test_set_annotation_keeps_spaces() {
        assert_eq!(
            parse_command("r 2 logo partly  hidden"),
            Ok(SessionCommand::SetAnnotation {
                id: 2,
                field: AnnotationField::Reason,
                value: "logo partly  hidden".to_string(),
            })
        );
        assert_eq!(
            parse_command("v 1 brand"),
            Ok(SessionCommand::SetAnnotation {
                id: 1,
                field: AnnotationField::ViolationType,
                value: "brand".to_string(),
            })
        );
        assert!(parse_command("v 1").is_err());
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            parse_command("status neg"),
            Ok(SessionCommand::Status(StatusFilter::Only(Label::Neg)))
        );
        assert_eq!(parse_command("status ALL"), Ok(SessionCommand::Status(StatusFilter::All)));
        assert_eq!(
            parse_command("search A, B"),
            Ok(SessionCommand::SearchTypes(SearchSelection::Only(vec![
                "A".to_string(),
                "B".to_string()
            ])))
        );
        assert_eq!(
            parse_command("search all"),
            Ok(SessionCommand::SearchTypes(SearchSelection::All))
        );
        assert!(parse_command("search").is_err());
        assert!(parse_command("search  , ").is_err());
        assert_eq!(
            parse_command("violation None"),
            Ok(SessionCommand::Violation(ViolationFilter::Only("None".to_string())))
        );
        assert_eq!(
            parse_command("range 5 20"),
            Ok(SessionCommand::Range { low: 5, high: 20 })
        );
        assert!(parse_command("range 5").is_err());
        assert!(parse_command("range 1 2 3").is_err());
    }

    #[test]
    fn test_misc() {
        assert_eq!(parse_command("size 25"), Ok(SessionCommand::PageSize(25)));
        assert!(parse_command("size 0").is_err());
        assert_eq!(parse_command("save"), Ok(SessionCommand::Save(None)));
        assert_eq!(
            parse_command("save /tmp/a.json"),
            Ok(SessionCommand::Save(Some(PathBuf::from("/tmp/a.json"))))
        );
        assert_eq!(parse_command("q"), Ok(SessionCommand::Quit));
        assert!(parse_command("frobnicate").is_err());
    }
}
