//! タイトル分類モジュール
//!
//! カタログからローマ字表記と英語表記を集め、
//! ローマ字優先の候補リストを作る。
//!
//! ## 処理フロー
//! 1. JA/EN 表記の収集（ポリシーに従う）
//! 2. 英語表記の昇格（ローマ字表記の `:` / 空白区切りの接頭辞になっているもの）
//! 3. ローマ字と完全一致する英語表記の除去
//! 4. ローマ字 → 英語 の順で連結

use crate::config::{ClassifierConfig, NamePolicy};
use crate::types::{Catalog, LANG_ENGLISH, LANG_ROMAJI};
use indexmap::IndexSet;
use std::collections::HashSet;

/// 分類結果（いずれも挿入順を保持）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub romaji: IndexSet<String>,
    pub english: IndexSet<String>,
    /// 英語からローマ字へ昇格した件数
    pub promoted: usize,
}

impl Classification {
    /// ドロップダウン用の候補リスト（ローマ字 → 英語）
    pub fn ordered_list(&self) -> Vec<String> {
        self.romaji
            .iter()
            .chain(self.english.iter())
            .cloned()
            .collect()
    }

    /// 比較関数用のローマ字集合（カタログから切り離したコピー）
    pub fn romaji_membership(&self) -> HashSet<String> {
        self.romaji.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.romaji.len() + self.english.len()
    }

    pub fn is_empty(&self) -> bool {
        self.romaji.is_empty() && self.english.is_empty()
    }
}

/// `romaji` が `english` の直後に `:` か空白を続けた形で始まるか
fn is_delimited_prefix(romaji: &str, english: &str) -> bool {
    romaji
        .strip_prefix(english)
        .is_some_and(|rest| rest.starts_with(':') || rest.starts_with(' '))
}

/// カタログを分類する
pub fn classify(catalog: &Catalog, config: &ClassifierConfig) -> Classification {
    let mut romaji: IndexSet<String> = IndexSet::new();
    let mut english: IndexSet<String> = IndexSet::new();

    for entry in catalog.entries() {
        let variants = entry.variants();
        if variants.is_empty() {
            tracing::trace!("表記なしのエントリをスキップ");
            continue;
        }

        // エントリ内では JA を先に処理する
        for text in variants
            .iter()
            .filter(|v| v.language == LANG_ROMAJI)
            .filter_map(|v| v.text())
        {
            romaji.insert(text.to_string());
        }

        for text in variants
            .iter()
            .filter(|v| v.language == LANG_ENGLISH)
            .filter_map(|v| v.text())
        {
            if config.name_policy == NamePolicy::RomajiWins && romaji.contains(text) {
                continue;
            }
            english.insert(text.to_string());
        }
    }

    let mut promoted = 0;
    if config.enable_promotion {
        let to_promote: Vec<String> = english
            .iter()
            .filter(|e| romaji.iter().any(|j| is_delimited_prefix(j, e)))
            .cloned()
            .collect();

        for title in to_promote {
            english.shift_remove(&title);
            romaji.insert(title);
            promoted += 1;
        }
    }

    // 完全一致はローマ字側に残す
    english.retain(|e| !romaji.contains(e));

    tracing::debug!(
        romaji = romaji.len(),
        english = english.len(),
        promoted,
        "カタログを分類"
    );

    Classification {
        romaji,
        english,
        promoted,
    }
}

/// 設定を保持する分類器
#[derive(Debug, Clone, Default)]
pub struct NameClassifier {
    config: ClassifierConfig,
}

impl NameClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, catalog: &Catalog) -> Classification {
        classify(catalog, &self.config)
    }
}
