//! ログ設定
//!
//! `ROMAJI_DROPDOWN_LOG`（なければ `RUST_LOG`）でフィルタを指定する。
//! 出力は標準エラーのみ（標準出力は候補リスト用）。

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ROMAJI_DROPDOWN_LOG";

fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(val) = std::env::var(LOG_ENV) {
        return EnvFilter::builder().parse_lossy(val);
    }
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(if verbose { "debug" } else { "warn" })
}

pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
