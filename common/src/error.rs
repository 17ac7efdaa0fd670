//! エラー型定義

use std::time::Duration;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// ホスト側の機能がまだ利用できない
    #[error("Not ready yet: {0}")]
    NotReadyYet(String),

    /// 待機の上限回数に達した
    #[error("Timeout waiting for {what} ({}ms)", waited.as_millis())]
    Timeout { what: String, waited: Duration },

    /// カタログ取得は成功したが中身が空
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// セットアップ中の想定外の失敗（ホストオブジェクトの形が違う等）
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// リトライで回復しうるエラーか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::NotReadyYet(_) | Error::EmptyCatalog | Error::Initialization(_)
        )
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_timeout() {
        let error = Error::Timeout {
            what: "libraryCacheHandler".to_string(),
            waited: Duration::from_millis(15000),
        };
        assert_eq!(
            format!("{}", error),
            "Timeout waiting for libraryCacheHandler (15000ms)"
        );
    }

    #[test]
    fn test_error_display_not_ready() {
        let error = Error::NotReadyYet("socket".to_string());
        assert_eq!(format!("{}", error), "Not ready yet: socket");
    }

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(Error::EmptyCatalog.is_retryable());
        assert!(Error::NotReadyYet("quiz".into()).is_retryable());
        assert!(Error::Initialization("bad shape".into()).is_retryable());
        assert!(!Error::Config("x".into()).is_retryable());
        assert!(!Error::Timeout {
            what: "x".into(),
            waited: Duration::ZERO
        }
        .is_retryable());
    }
}
