//! カタログの型定義
//!
//! ホストのライブラリキャッシュから受け取るデータ:
//! - NameVariant: 言語タグ付きのタイトル表記
//! - TitledEntry: 1作品分のレコード
//! - Catalog: 作品IDをキーにした全レコード

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// ローマ字表記の言語タグ
pub const LANG_ROMAJI: &str = "JA";

/// 英語表記の言語タグ
pub const LANG_ENGLISH: &str = "EN";

/// 言語タグ付きのタイトル表記
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameVariant {
    /// 言語タグ（大文字小文字を区別して比較）
    pub language: String,
    /// 表記テキスト（欠落・空文字はスキップ対象）
    pub name: Option<String>,
}

impl NameVariant {
    pub fn new(language: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            name: Some(name.into()),
        }
    }

    /// 空でないテキストのみ返す
    pub fn text(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }
}

/// カタログの1レコード（1作品）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitledEntry {
    pub names: Option<Vec<NameVariant>>,
}

impl TitledEntry {
    pub fn with_names(names: Vec<NameVariant>) -> Self {
        Self { names: Some(names) }
    }

    /// 表記一覧（欠落時は空スライス）
    pub fn variants(&self) -> &[NameVariant] {
        self.names.as_deref().unwrap_or(&[])
    }
}

/// 作品ID → レコードのマップ
///
/// ホストはオブジェクト形式で渡すが、配列形式のダンプも受け付ける。
/// 配列の場合はインデックスをキーにする。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: IndexMap<String, TitledEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogRepr {
    Map(IndexMap<String, TitledEntry>),
    List(Vec<TitledEntry>),
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match CatalogRepr::deserialize(deserializer)? {
            CatalogRepr::Map(entries) => Self { entries },
            CatalogRepr::List(list) => Self::from_entries(list),
        })
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 配列からカタログを構築（キーは連番）
    pub fn from_entries(entries: impl IntoIterator<Item = TitledEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .enumerate()
                .map(|(i, entry)| (i.to_string(), entry))
                .collect(),
        }
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        Ok(catalog)
    }

    /// JSONファイルから読み込み（非WASM環境のみ）
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: TitledEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&TitledEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &TitledEntry> {
        self.entries.values()
    }
}

impl FromIterator<(String, TitledEntry)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, TitledEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
