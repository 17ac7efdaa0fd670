//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use romaji_dropdown::config::Config;
use romaji_dropdown::error::RomajiDropdownError;
use romaji_dropdown::source::read_catalog;
use romaji_dropdown_common::RetryPolicy;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

/// 存在しないカタログを待たずに読んだ場合
#[tokio::test]
async fn test_read_nonexistent_catalog() {
    let result = read_catalog(
        Path::new("/nonexistent/path/12345/catalog.json"),
        false,
        &RetryPolicy::default(),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, RomajiDropdownError::FileNotFound(_)));
}

/// 空のカタログファイル（{}）はエラーではなく空のカタログ
#[tokio::test]
async fn test_read_empty_object_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "{}").unwrap();

    let catalog = read_catalog(&path, false, &RetryPolicy::default())
        .await
        .expect("空カタログはエラーにしない");
    assert!(catalog.is_empty());
}

/// 待機モードで空のカタログが続く場合は上限で諦める
#[tokio::test]
async fn test_wait_gives_up_on_empty_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "{}").unwrap();

    let retry = RetryPolicy {
        empty_catalog_retry_ms: 1,
        max_empty_catalog_retries: Some(1),
        ..Default::default()
    };
    let err = read_catalog(&path, true, &retry).await.unwrap_err();
    assert!(matches!(
        err,
        RomajiDropdownError::Common(romaji_dropdown_common::Error::EmptyCatalog)
    ));
}

/// 壊れた設定ファイル
#[test]
fn test_broken_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, RomajiDropdownError::JsonParse(_)));
}

/// RomajiDropdownErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        RomajiDropdownError::Config("テスト設定エラー".to_string()),
        RomajiDropdownError::FileNotFound("catalog.json".to_string()),
        RomajiDropdownError::UnknownPreset("katakana".to_string()),
        RomajiDropdownError::InvalidCatalog("不正なカタログ".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 不明なプリセットは候補名を案内する
#[test]
fn test_unknown_preset_message() {
    let err = RomajiDropdownError::UnknownPreset("katakana".to_string());
    let display = format!("{}", err);

    assert!(display.contains("katakana"));
    assert!(display.contains("romaji-promote"));
}

/// エラーのDebug実装確認
#[test]
fn test_error_debug() {
    let err = RomajiDropdownError::Config("テスト".to_string());
    let debug = format!("{:?}", err);

    assert!(debug.contains("Config"));
    assert!(debug.contains("テスト"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: RomajiDropdownError = io_err.into();

    assert!(matches!(err, RomajiDropdownError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: RomajiDropdownError = json_err.into();

    assert!(matches!(err, RomajiDropdownError::JsonParse(_)));
}

/// エラーチェーン（透過的エラー）
#[test]
fn test_error_chain_transparent() {
    let common_err = romaji_dropdown_common::Error::Timeout {
        what: "host globals".to_string(),
        waited: Duration::from_millis(15_000),
    };
    let err: RomajiDropdownError = common_err.into();

    // 透過的エラーなのでメッセージがそのまま表示される
    assert!(matches!(err, RomajiDropdownError::Common(_)));
    assert_eq!(format!("{}", err), "Timeout waiting for host globals (15000ms)");
}

/// 再試行可能かどうかの分類
#[test]
fn test_common_error_retryable() {
    assert!(romaji_dropdown_common::Error::EmptyCatalog.is_retryable());
    assert!(romaji_dropdown_common::Error::Initialization("x".into()).is_retryable());
    assert!(!romaji_dropdown_common::Error::Config("x".into()).is_retryable());
}
