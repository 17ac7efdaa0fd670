//! 表示順の比較関数
//!
//! ホストは独自にリストを再ソートするため、
//! 分類結果の順序を保つ比較関数を渡す。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

/// 比較方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparatorStrategy {
    /// ローマ字優先 → 短い順 → 辞書順
    #[default]
    LengthThenAlpha,
    /// 常に同順位（安定ソートならリスト順のまま）
    HostDefault,
}

impl std::str::FromStr for ComparatorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "length-then-alpha" | "length" => Ok(ComparatorStrategy::LengthThenAlpha),
            "host-default" | "host" | "keep" => Ok(ComparatorStrategy::HostDefault),
            _ => Err(format!(
                "Unknown strategy: {}. Use length-then-alpha or host-default",
                s
            )),
        }
    }
}

impl std::fmt::Display for ComparatorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparatorStrategy::LengthThenAlpha => write!(f, "length-then-alpha"),
            ComparatorStrategy::HostDefault => write!(f, "host-default"),
        }
    }
}

/// ホスト標準の二次順序: 短い順、同じ長さなら辞書順
///
/// 長さも辞書順もホスト側と合わせるためUTF-16単位で扱う。
fn length_then_alpha(a: &str, b: &str) -> Ordering {
    let len_a = a.encode_utf16().count();
    let len_b = b.encode_utf16().count();
    len_a
        .cmp(&len_b)
        .then_with(|| a.encode_utf16().cmp(b.encode_utf16()))
}

/// ローマ字集合に含まれる表記を先頭に寄せて比較
pub fn compare_for_display(a: &str, b: &str, romaji: &HashSet<String>) -> Ordering {
    match (romaji.contains(a), romaji.contains(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => length_then_alpha(a, b),
    }
}

/// ホストの比較スロットに渡す比較関数
#[derive(Debug, Clone)]
pub struct DisplayComparator {
    strategy: ComparatorStrategy,
    romaji: Arc<HashSet<String>>,
}

impl DisplayComparator {
    pub fn new(strategy: ComparatorStrategy, romaji: Arc<HashSet<String>>) -> Self {
        Self { strategy, romaji }
    }

    pub fn strategy(&self) -> ComparatorStrategy {
        self.strategy
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self.strategy {
            ComparatorStrategy::LengthThenAlpha => compare_for_display(a, b, &self.romaji),
            ComparatorStrategy::HostDefault => Ordering::Equal,
        }
    }

    /// JS の sort コールバック向けに -1 / 0 / 1 で返す
    pub fn sign(&self, a: &str, b: &str) -> i32 {
        match self.compare(a, b) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// リストをこの比較関数で安定ソート
    pub fn sort(&self, list: &mut [String]) {
        list.sort_by(|a, b| self.compare(a, b));
    }
}
