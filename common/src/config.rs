//! 設定モジュール
//!
//! 分類ポリシーとリトライ間隔をまとめる。
//! 2種類のスクリプト版の違いはプリセットで切り替える。

use crate::comparator::ComparatorStrategy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 1パス目でのJA/EN収集ポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamePolicy {
    /// JAとENを独立に収集（昇格パスで整理）
    #[default]
    Independent,
    /// 既にJAにある表記はENに入れない
    RomajiWins,
}

impl std::str::FromStr for NamePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "independent" | "b" => Ok(NamePolicy::Independent),
            "romaji-wins" | "romajiwins" | "a" => Ok(NamePolicy::RomajiWins),
            _ => Err(format!("Unknown policy: {}. Use independent or romaji-wins", s)),
        }
    }
}

impl std::fmt::Display for NamePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamePolicy::Independent => write!(f, "independent"),
            NamePolicy::RomajiWins => write!(f, "romaji-wins"),
        }
    }
}

/// 分類器の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierConfig {
    /// 英語表記をローマ字側へ昇格させるか
    pub enable_promotion: bool,
    pub name_policy: NamePolicy,
    /// ホストの再ソートに渡す比較方式
    pub comparator: ComparatorStrategy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enable_promotion: true,
            name_policy: NamePolicy::Independent,
            comparator: ComparatorStrategy::LengthThenAlpha,
        }
    }
}

/// 待機・再試行の間隔
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// ホストのグローバル待ちのポーリング間隔
    pub readiness_interval_ms: u64,
    pub readiness_max_attempts: u32,
    /// 空カタログ時の再取得間隔
    pub empty_catalog_retry_ms: u64,
    /// 空カタログの再取得上限（Noneなら無制限）
    pub max_empty_catalog_retries: Option<u32>,
    /// セットアップ失敗時の再試行間隔
    pub init_retry_ms: u64,
    /// "quiz ready" 受信からリスト差し替えまでの遅延
    pub quiz_ready_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            readiness_interval_ms: 250,
            readiness_max_attempts: 60,
            empty_catalog_retry_ms: 2000,
            max_empty_catalog_retries: None,
            init_retry_ms: 5000,
            quiz_ready_delay_ms: 100,
        }
    }
}

impl RetryPolicy {
    pub fn readiness_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_interval_ms)
    }

    pub fn empty_catalog_retry(&self) -> Duration {
        Duration::from_millis(self.empty_catalog_retry_ms)
    }

    pub fn init_retry(&self) -> Duration {
        Duration::from_millis(self.init_retry_ms)
    }

    pub fn quiz_ready_delay(&self) -> Duration {
        Duration::from_millis(self.quiz_ready_delay_ms)
    }
}

/// 全体設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropdownConfig {
    pub classifier: ClassifierConfig,
    pub retry: RetryPolicy,
}

impl DropdownConfig {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "romaji-promote" | "promote" | "default" => Some(Self::default()),
            "romaji-first" | "legacy" => Some(Self::romaji_first_preset()),
            _ => None,
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["romaji-promote", "romaji-first"]
    }

    /// 昇格なし・リスト順をそのまま使う旧版の挙動
    fn romaji_first_preset() -> Self {
        Self {
            classifier: ClassifierConfig {
                enable_promotion: false,
                name_policy: NamePolicy::RomajiWins,
                comparator: ComparatorStrategy::HostDefault,
            },
            retry: RetryPolicy::default(),
        }
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// JSONファイルから読み込み（非WASM環境のみ）
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.readiness_max_attempts == 0 {
            return Err(Error::Config("readinessMaxAttempts must be at least 1".into()));
        }
        if self.retry.readiness_interval_ms == 0 {
            return Err(Error::Config("readinessIntervalMs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_promote_preset() {
        let config = DropdownConfig::from_preset("romaji-promote").unwrap();
        assert_eq!(config, DropdownConfig::default());
        assert!(config.classifier.enable_promotion);
        assert_eq!(config.classifier.name_policy, NamePolicy::Independent);
        assert_eq!(config.retry.empty_catalog_retry(), Duration::from_secs(2));
        assert_eq!(config.retry.init_retry(), Duration::from_secs(5));
    }

    #[test]
    fn test_romaji_first_preset() {
        let config = DropdownConfig::from_preset("Romaji-First").unwrap();
        assert!(!config.classifier.enable_promotion);
        assert_eq!(config.classifier.name_policy, NamePolicy::RomajiWins);
        assert_eq!(config.classifier.comparator, ComparatorStrategy::HostDefault);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(DropdownConfig::from_preset("katakana").is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"classifier": {"enablePromotion": false}, "retry": {"initRetryMs": 1000}}"#;
        let config = DropdownConfig::from_json(json).unwrap();

        assert!(!config.classifier.enable_promotion);
        assert_eq!(config.classifier.comparator, ComparatorStrategy::LengthThenAlpha);
        assert_eq!(config.retry.init_retry_ms, 1000);
        assert_eq!(config.retry.readiness_max_attempts, 60);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("romaji-wins".parse::<NamePolicy>(), Ok(NamePolicy::RomajiWins));
        assert_eq!("Independent".parse::<NamePolicy>(), Ok(NamePolicy::Independent));
        assert!("other".parse::<NamePolicy>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let json = r#"{"retry": {"readinessMaxAttempts": 0}}"#;
        let err = DropdownConfig::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_string(&DropdownConfig::default()).unwrap();
        assert!(json.contains("\"enablePromotion\":true"));
        assert!(json.contains("\"namePolicy\":\"independent\""));
        assert!(json.contains("\"comparator\":\"length-then-alpha\""));
        assert!(json.contains("\"emptyCatalogRetryMs\":2000"));
    }
}
