//! ドロップダウン状態のコントローラ
//!
//! 候補リストと初期化状態を1つのオブジェクトで所有する。
//! 分類パスは新しいスナップショットを作ってから差し替えるので、
//! 読み手が作りかけのリストを見ることはない。

use crate::classifier::{Classification, NameClassifier};
use crate::comparator::{ComparatorStrategy, DisplayComparator};
use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::host::{
    AutocompleteHost, CatalogDelta, CatalogEvent, CatalogVersion, HostCommand, InitialNamesPayload,
    NamesDeltaPayload, CMD_GET_ALL_NAMES, CMD_UPDATE_ALL_NAMES,
};
use crate::types::Catalog;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

/// 1回の分類パスの結果（不変）
#[derive(Debug, Clone, Default)]
pub struct DropdownSnapshot {
    list: Vec<String>,
    romaji: Arc<HashSet<String>>,
    english_count: usize,
    promoted: usize,
}

impl DropdownSnapshot {
    pub fn from_classification(classification: &Classification) -> Self {
        Self {
            list: classification.ordered_list(),
            romaji: Arc::new(classification.romaji_membership()),
            english_count: classification.english.len(),
            promoted: classification.promoted,
        }
    }

    pub fn list(&self) -> &[String] {
        &self.list
    }

    pub fn romaji(&self) -> &Arc<HashSet<String>> {
        &self.romaji
    }

    pub fn romaji_count(&self) -> usize {
        self.romaji.len()
    }

    pub fn english_count(&self) -> usize {
        self.english_count
    }

    pub fn promoted(&self) -> usize {
        self.promoted
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn comparator(&self, strategy: ComparatorStrategy) -> DisplayComparator {
        DisplayComparator::new(strategy, Arc::clone(&self.romaji))
    }
}

/// ホストから「リスト更新」を求められた時の動き
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePlan {
    /// まだリストがない: ホスト標準の処理に任せる
    UseHostDefault,
    /// バージョン未取得: 初回取得を要求
    RequestInitial,
    /// 差分取得を要求
    RequestDelta { current_version: CatalogVersion },
}

impl UpdatePlan {
    /// ソケットに送るコマンド
    pub fn command(&self) -> Option<HostCommand> {
        match self {
            UpdatePlan::UseHostDefault => None,
            UpdatePlan::RequestInitial => Some(HostCommand::get_all_names()),
            UpdatePlan::RequestDelta { current_version } => {
                Some(HostCommand::update_all_names(current_version))
            }
        }
    }

    /// 応答として待つイベント名
    pub fn reply_event(&self) -> Option<&'static str> {
        match self {
            UpdatePlan::UseHostDefault => None,
            UpdatePlan::RequestInitial => Some(CMD_GET_ALL_NAMES),
            UpdatePlan::RequestDelta { .. } => Some(CMD_UPDATE_ALL_NAMES),
        }
    }

    /// 応答ペイロードを変更通知にする（形が違えば既定値で埋める）
    pub fn parse_reply(&self, payload: serde_json::Value) -> Option<CatalogEvent> {
        match self {
            UpdatePlan::UseHostDefault => None,
            UpdatePlan::RequestInitial => {
                let parsed: InitialNamesPayload = serde_json::from_value(payload)
                    .unwrap_or_else(|e| {
                        tracing::warn!("初回応答の形が不正: {}", e);
                        InitialNamesPayload::default()
                    });
                Some(CatalogEvent::InitialFetched {
                    version: parsed.version,
                })
            }
            UpdatePlan::RequestDelta { .. } => {
                let parsed: NamesDeltaPayload = serde_json::from_value(payload)
                    .unwrap_or_else(|e| {
                        tracing::warn!("差分応答の形が不正: {}", e);
                        NamesDeltaPayload::default()
                    });
                Some(CatalogEvent::Delta(parsed.into()))
            }
        }
    }
}

/// 応答を受けた後の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// リストを反映した（`refresh` ならカタログを取り直す）
    Adopted { refresh: bool },
    /// 差分なし、またはリスト未準備
    Unchanged,
}

/// ドロップダウンの状態を所有するコントローラ
#[derive(Debug, Clone, Default)]
pub struct DropdownController {
    classifier: NameClassifier,
    snapshot: Option<Arc<DropdownSnapshot>>,
    /// 最後に受信したバージョン（判断はインスタンス側の値で行う）
    version: Option<CatalogVersion>,
    initialized: bool,
}

impl DropdownController {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            classifier: NameClassifier::new(config),
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        self.classifier.config()
    }

    /// カタログ取得完了時に全件分類してリストを差し替える
    ///
    /// 空・未取得のカタログは `EmptyCatalog` を返し、既存のリストは残す。
    pub fn on_catalog_ready(&mut self, catalog: Option<&Catalog>) -> Result<Arc<DropdownSnapshot>> {
        let catalog = catalog
            .filter(|c| !c.is_empty())
            .ok_or(Error::EmptyCatalog)?;

        let classification = self.classifier.classify(catalog);
        let snapshot = Arc::new(DropdownSnapshot::from_classification(&classification));
        tracing::info!(
            "Loaded {} Romaji + {} English names ({} total)",
            snapshot.romaji_count(),
            snapshot.english_count(),
            snapshot.list().len()
        );

        self.snapshot = Some(Arc::clone(&snapshot));
        self.initialized = true;
        Ok(snapshot)
    }

    /// 差分通知のバージョンを記録し、再分類が必要かを返す
    pub fn record_delta(&mut self, delta: &CatalogDelta) -> bool {
        self.record_version(delta.version.clone());
        if delta.is_empty() {
            tracing::debug!("差分なし、再分類をスキップ");
            return false;
        }
        tracing::debug!(added = delta.added, removed = delta.removed, "カタログ差分を受信");
        true
    }

    /// カタログ変更時の処理（差分が空なら何もしない）
    pub fn on_catalog_changed(
        &mut self,
        delta: &CatalogDelta,
        catalog: Option<&Catalog>,
    ) -> Result<Option<Arc<DropdownSnapshot>>> {
        if !self.record_delta(delta) {
            return Ok(None);
        }
        self.on_catalog_ready(catalog).map(Some)
    }

    /// 初回取得応答のバージョンを記録
    pub fn on_initial_names(&mut self, version: CatalogVersion) {
        self.record_version(version);
    }

    /// ホストからの変更通知を反映し、再分類が必要かを返す
    pub fn handle_event(&mut self, event: CatalogEvent) -> bool {
        match event {
            CatalogEvent::InitialFetched { version } => {
                self.on_initial_names(version);
                false
            }
            CatalogEvent::Delta(delta) => self.record_delta(&delta),
        }
    }

    fn record_version(&mut self, version: CatalogVersion) {
        self.version = if version.is_null() { None } else { Some(version) };
    }

    /// ホストのリスト更新要求に対する方針
    ///
    /// `instance_version` は updateList を呼んだインスタンスが持つ値。
    /// 未取得（None / null）なら初回取得から始める。
    pub fn plan_update(&self, instance_version: Option<&CatalogVersion>) -> UpdatePlan {
        if self.current_list().is_empty() {
            return UpdatePlan::UseHostDefault;
        }
        match instance_version.filter(|v| !v.is_null()) {
            None => UpdatePlan::RequestInitial,
            Some(version) => UpdatePlan::RequestDelta {
                current_version: version.clone(),
            },
        }
    }

    pub fn plan_for<H: AutocompleteHost + ?Sized>(&self, host: &H) -> UpdatePlan {
        self.plan_update(host.version().as_ref())
    }

    /// 現在のリストをホストに反映（リストがなければ何もしない）
    pub fn adopt_into<H: AutocompleteHost + ?Sized>(&self, host: &mut H) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        host.set_list(snapshot.list());
        host.rebuild_index();
        host.set_comparator(snapshot.comparator(self.config().comparator));
        true
    }

    pub fn current_list(&self) -> &[String] {
        self.snapshot.as_deref().map(|s| s.list()).unwrap_or(&[])
    }

    pub fn snapshot(&self) -> Option<Arc<DropdownSnapshot>> {
        self.snapshot.clone()
    }

    pub fn version(&self) -> Option<&CatalogVersion> {
        self.version.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// 名前一覧の応答をインスタンスへ反映する
///
/// バージョンは常に書き戻す。初回応答と空でない差分では現在のリストを反映する。
/// ホストを操作している間は可変借用を持たない。
pub fn complete_update<H: AutocompleteHost + ?Sized>(
    controller: &RefCell<DropdownController>,
    host: &mut H,
    event: CatalogEvent,
) -> UpdateOutcome {
    host.set_version(event.version().clone());

    let initial = matches!(event, CatalogEvent::InitialFetched { .. });
    let changed = controller.borrow_mut().handle_event(event);
    if !initial && !changed {
        return UpdateOutcome::Unchanged;
    }

    if !controller.borrow().adopt_into(host) {
        return UpdateOutcome::Unchanged;
    }
    UpdateOutcome::Adopted { refresh: changed }
}
