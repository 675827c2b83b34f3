use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ユーザー設定（~/.config/survey-reconcile/config.json）
///
/// ファイルに無い項目は既定値で補う。CLIの引数が指定されればそちらを優先する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// ヘッダー曖昧一致の閾値（0.0-1.0、この値を超えたら採用）
    pub header_threshold: f64,
    /// 名前照合の閾値（0-100）
    pub name_threshold: u8,
    /// レコード採用に必須の正規キー
    pub required_key: String,
    /// 画像照合に使う名前の正規キー
    pub name_key: String,
    /// 人物画像フォルダ
    pub image_dir: Option<PathBuf>,
    /// カスタムカタログJSON
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_threshold: 0.7,
            name_threshold: 70,
            required_key: "employee_name".into(),
            name_key: "employee_name".into(),
            image_dir: None,
            catalog_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（ファイルが無ければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReconcileError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("survey-reconcile").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.header_threshold) {
            return Err(ReconcileError::Config(format!(
                "header_threshold は 0.0〜1.0 で指定してください: {}",
                self.header_threshold
            )));
        }
        if self.name_threshold > 100 {
            return Err(ReconcileError::Config(format!(
                "name_threshold は 0〜100 で指定してください: {}",
                self.name_threshold
            )));
        }
        if self.required_key.trim().is_empty() {
            return Err(ReconcileError::Config("required_key が空です".into()));
        }
        if self.name_key.trim().is_empty() {
            return Err(ReconcileError::Config("name_key が空です".into()));
        }
        Ok(())
    }
}
