//! ホスト連携の境界
//!
//! コアはホストのオブジェクトに直接触れず、ここのトレイト越しに操作する。
//! ブラウザ側の実装は web-wasm クレートにある。

use crate::comparator::DisplayComparator;
use crate::error::Result;
use crate::types::Catalog;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 初回取得のイベント名兼コマンド名
pub const CMD_GET_ALL_NAMES: &str = "get all song names";

/// 差分取得のイベント名兼コマンド名
pub const CMD_UPDATE_ALL_NAMES: &str = "update all song names";

/// クイズ開始イベント
pub const EVENT_QUIZ_READY: &str = "quiz ready";

/// ホストが返すバージョン（数値でも文字列でもそのまま返送する）
pub type CatalogVersion = serde_json::Value;

/// オートコンプリート側の操作
pub trait AutocompleteHost {
    /// 候補リストを丸ごと差し替える
    fn set_list(&mut self, list: &[String]);

    /// リスト差し替え後に必ず呼ぶ
    fn rebuild_index(&mut self);

    /// 再ソート用の比較関数を設定
    fn set_comparator(&mut self, comparator: DisplayComparator);

    /// このインスタンスが持つ名前一覧のバージョン（未取得なら None）
    fn version(&self) -> Option<CatalogVersion>;

    /// 応答のバージョンをインスタンスへ書き戻す
    fn set_version(&mut self, version: CatalogVersion);
}

/// カタログの取得元
///
/// 未準備なら `Ok(None)` または空のカタログを返す。
#[async_trait(?Send)]
pub trait CatalogSource {
    async fn fetch_catalog(&self) -> Result<Option<Catalog>>;
}

/// 待機の実装（ブラウザのタイマー / tokio）
#[async_trait(?Send)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// カタログ差分の通知内容
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogDelta {
    pub version: CatalogVersion,
    pub added: usize,
    pub removed: usize,
}

impl CatalogDelta {
    pub fn is_empty(&self) -> bool {
        self.added + self.removed == 0
    }
}

/// "get all song names" の応答
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InitialNamesPayload {
    pub version: CatalogVersion,
}

/// "update all song names" の応答
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamesDeltaPayload {
    pub version: CatalogVersion,
    pub new: Vec<serde_json::Value>,
    pub deleted: Vec<serde_json::Value>,
}

impl From<NamesDeltaPayload> for CatalogDelta {
    fn from(payload: NamesDeltaPayload) -> Self {
        Self {
            version: payload.version,
            added: payload.new.len(),
            removed: payload.deleted.len(),
        }
    }
}

/// ホストからのカタログ変更通知
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    InitialFetched { version: CatalogVersion },
    Delta(CatalogDelta),
}

impl CatalogEvent {
    pub fn version(&self) -> &CatalogVersion {
        match self {
            CatalogEvent::InitialFetched { version } => version,
            CatalogEvent::Delta(delta) => &delta.version,
        }
    }
}

/// ソケット経由で送るコマンド
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostCommand {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl HostCommand {
    pub fn get_all_names() -> Self {
        Self {
            kind: "quiz",
            command: CMD_GET_ALL_NAMES,
            data: None,
        }
    }

    pub fn update_all_names(current_version: &CatalogVersion) -> Self {
        Self {
            kind: "quiz",
            command: CMD_UPDATE_ALL_NAMES,
            data: Some(serde_json::json!({ "currentVersion": current_version })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_delta_from_payload() {
        let payload: NamesDeltaPayload = serde_json::from_value(json!({
            "version": 42,
            "new": [{"annId": 1}, {"annId": 2}],
            "deleted": []
        }))
        .unwrap();

        let delta = CatalogDelta::from(payload);
        assert_eq!(delta.version, json!(42));
        assert_eq!(delta.added, 2);
        assert_eq!(delta.removed, 0);
        assert!(!delta.is_empty());
    }

    #[test]
    fn test_delta_missing_lists_is_empty() {
        let payload: NamesDeltaPayload = serde_json::from_value(json!({"version": 7})).unwrap();
        assert!(CatalogDelta::from(payload).is_empty());
    }

    #[test]
    fn test_initial_command_json() {
        let json = serde_json::to_value(HostCommand::get_all_names()).unwrap();
        assert_eq!(json, json!({"type": "quiz", "command": "get all song names"}));
    }

    #[test]
    fn test_update_command_json() {
        let json = serde_json::to_value(HostCommand::update_all_names(&json!(12))).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "quiz",
                "command": "update all song names",
                "data": {"currentVersion": 12}
            })
        );
    }
}
