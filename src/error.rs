use thiserror::Error;

#[derive(Error, Debug)]
pub enum RomajiDropdownError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("不明なプリセット: {0} (romaji-promote/romaji-first)")]
    UnknownPreset(String),

    #[error("カタログが不正: {0}")]
    InvalidCatalog(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] romaji_dropdown_common::Error),
}

pub type Result<T> = std::result::Result<T, RomajiDropdownError>;
