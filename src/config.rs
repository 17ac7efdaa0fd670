use crate::cli::OutputFormat;
use crate::error::{RomajiDropdownError, Result};
use romaji_dropdown_common::DropdownConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルの場所を上書きする環境変数
pub const CONFIG_ENV: &str = "ROMAJI_DROPDOWN_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub dropdown: DropdownConfig,
    pub output_format: OutputFormat,
}

impl Config {
    /// 既定の場所から読み込み（なければ既定値）
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.dropdown.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        // 環境変数を優先
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| RomajiDropdownError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("romaji-dropdown").join("config.json"))
    }

    /// プリセットで分類・リトライ設定を置き換える
    pub fn apply_preset(&mut self, name: &str) -> Result<()> {
        self.dropdown = DropdownConfig::from_preset(name)
            .ok_or_else(|| RomajiDropdownError::UnknownPreset(name.to_string()))?;
        Ok(())
    }
}
