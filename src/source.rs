//! ファイルからのカタログ取得
//!
//! ブラウザのキャッシュの代わりにJSONダンプを読む。
//! ファイルが未作成・空の間は「未準備」として扱う。

use crate::error::RomajiDropdownError;
use async_trait::async_trait;
use romaji_dropdown_common::{load_catalog, Catalog, CatalogSource, Result, RetryPolicy, Sleeper};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// JSONファイルをカタログ取得元にする
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait(?Send)]
impl CatalogSource for FileCatalogSource {
    async fn fetch_catalog(&self) -> Result<Option<Catalog>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed == "null" {
            tracing::debug!(path = %self.path.display(), "catalog file is blank");
            return Ok(None);
        }
        Catalog::from_json(trimmed).map(Some)
    }
}

/// tokio のタイマーで待つ
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait(?Send)]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// カタログファイルを読む
///
/// `wait` が true なら、ファイルが未作成・空の間は再試行しながら待つ。
/// false なら空のカタログもそのまま返す。
pub async fn read_catalog(
    path: &Path,
    wait: bool,
    retry: &RetryPolicy,
) -> crate::error::Result<Catalog> {
    tracing::debug!(path = %path.display(), wait, "reading catalog");
    if wait {
        let source = FileCatalogSource::new(path);
        return Ok(load_catalog(&source, &TokioSleeper, retry).await?);
    }

    if !path.exists() {
        return Err(RomajiDropdownError::FileNotFound(path.display().to_string()));
    }
    Catalog::from_file(path).map_err(|e| match e {
        romaji_dropdown_common::Error::Json(e) => {
            RomajiDropdownError::InvalidCatalog(format!("{}: {}", path.display(), e))
        }
        other => other.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_not_ready() {
        let dir = tempdir().expect("Failed to create temp dir");
        let source = FileCatalogSource::new(dir.path().join("catalog.json"));
        assert!(source.fetch_catalog().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_file_is_not_ready() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "  \n").unwrap();

        let source = FileCatalogSource::new(&path);
        assert!(source.fetch_catalog().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_catalog() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"1": {"names": [{"language": "JA", "name": "Mushishi"}]}}"#).unwrap();

        let catalog = FileCatalogSource::new(&path)
            .fetch_catalog()
            .await
            .unwrap()
            .expect("カタログがない");
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_read_catalog_missing_without_wait() {
        let dir = tempdir().expect("Failed to create temp dir");
        let err = read_catalog(&dir.path().join("none.json"), false, &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RomajiDropdownError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_read_catalog_wait_bounded() {
        let dir = tempdir().expect("Failed to create temp dir");
        let retry = RetryPolicy {
            empty_catalog_retry_ms: 1,
            max_empty_catalog_retries: Some(2),
            ..Default::default()
        };

        let err = read_catalog(&dir.path().join("none.json"), true, &retry)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RomajiDropdownError::Common(romaji_dropdown_common::Error::EmptyCatalog)
        ));
    }

    #[tokio::test]
    async fn test_read_catalog_invalid_names_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = read_catalog(&path, false, &RetryPolicy::default())
            .await
            .unwrap_err();
        match err {
            RomajiDropdownError::InvalidCatalog(msg) => assert!(msg.contains("broken.json")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ invalid").unwrap();

        let result = FileCatalogSource::new(&path).fetch_catalog().await;
        assert!(matches!(result, Err(romaji_dropdown_common::Error::Json(_))));
    }
}
