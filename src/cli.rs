use clap::{Parser, Subcommand};
use romaji_dropdown_common::{ComparatorStrategy, NamePolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "romaji-dropdown")]
#[command(about = "オートコンプリート候補をローマ字優先に並べ替えるツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（省略時は ~/.config/romaji-dropdown/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// カタログJSONを分類して候補リストを出力
    Classify {
        /// カタログJSONファイル（オブジェクト形式または配列形式）
        #[arg(required = true)]
        catalog: PathBuf,

        /// 出力形式 (text/json)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// プリセット (romaji-promote/romaji-first)
        #[arg(long)]
        preset: Option<String>,

        /// 収集ポリシー (independent/romaji-wins)
        #[arg(long)]
        policy: Option<NamePolicy>,

        /// 英語表記の昇格を無効化
        #[arg(long)]
        no_promotion: bool,

        /// ホストの再ソートを再現して出力
        #[arg(long)]
        sort: bool,

        /// 比較方式 (length-then-alpha/host-default)
        #[arg(long)]
        strategy: Option<ComparatorStrategy>,

        /// カタログが空・未作成なら再試行しながら待つ
        #[arg(long)]
        wait: bool,

        /// --wait 時の再試行上限
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// 2つの表記を表示順で比較（-1/0/1）
    Compare {
        a: String,
        b: String,

        /// ローマ字として扱う表記（複数指定可）
        #[arg(short, long)]
        romaji: Vec<String>,

        /// 比較方式 (length-then-alpha/host-default)
        #[arg(long, default_value = "length-then-alpha")]
        strategy: ComparatorStrategy,
    },

    /// 設定を表示/編集
    Config {
        /// プリセットを適用して保存
        #[arg(long)]
        preset: Option<String>,

        /// 既定値に戻して保存
        #[arg(long)]
        reset: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 1行1候補
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
