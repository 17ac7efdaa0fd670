//! 分類結果の出力

use crate::cli::OutputFormat;
use crate::error::Result;
use romaji_dropdown_common::{
    Catalog, ClassifierConfig, ComparatorStrategy, DisplayComparator, NameClassifier,
};
use serde::Serialize;
use std::sync::Arc;

/// classify コマンドの結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyReport {
    /// ドロップダウンの候補（出力順）
    pub list: Vec<String>,
    pub romaji: Vec<String>,
    pub english: Vec<String>,
    pub promoted: usize,
    /// ホストの再ソートを適用したか
    pub sorted: bool,
    pub strategy: ComparatorStrategy,
}

impl ClassifyReport {
    pub fn build(catalog: &Catalog, config: &ClassifierConfig, sort: bool) -> Self {
        let classification = NameClassifier::new(*config).classify(catalog);
        let mut list = classification.ordered_list();

        if sort {
            let comparator = DisplayComparator::new(
                config.comparator,
                Arc::new(classification.romaji_membership()),
            );
            comparator.sort(&mut list);
        }

        Self {
            list,
            romaji: classification.romaji.iter().cloned().collect(),
            english: classification.english.iter().cloned().collect(),
            promoted: classification.promoted,
            sorted: sort,
            strategy: config.comparator,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Loaded {} Romaji + {} English names ({} total, {} promoted)",
            self.romaji.len(),
            self.english.len(),
            self.list.len(),
            self.promoted
        )
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => {
                let mut out = self.list.join("\n");
                if !out.is_empty() {
                    out.push('\n');
                }
                Ok(out)
            }
            OutputFormat::Json => {
                let mut out = serde_json::to_string_pretty(self)?;
                out.push('\n');
                Ok(out)
            }
        }
    }
}
