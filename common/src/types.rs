//! 照合結果の型定義
//!
//! CLIとコアで共有される型:
//! - ReconciledMapping: 列位置 → 正規フィールドの対応
//! - ReportEntry: 照合結果の監査用レポート行
//! - EmployeeRecord: 正規キー → 値のレコード（最終出力）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 画像照合結果を載せるキー（フィールド名には使えない）
pub const PROFILE_IMAGE_KEY: &str = "profile_image";

/// カード表示グループ（宣言順がデフォルトの並び順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    BasicInfo,
    PerformanceRatings,
    PerformanceComments,
    SoftwareTools,
    EmployeeDevelopment,
    OverallAssessment,
    /// 未知の列の受け皿
    AdditionalData,
}

/// レコード表示での扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardDisplayType {
    Hidden,
    NumericRating,
    SingleLineText,
    MultilineText,
}

/// 集計チャートでの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartDisplayType {
    Hidden,
    CategoricalDistribution,
    TimeProgression,
}

/// どのパスで対応付けられたか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Fallback,
}

/// 1列分の照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledMapping {
    pub column_position: usize,
    /// Excel列記号（A, B, ..., AA）
    pub column_letter: String,
    /// 元のヘッダー文字列
    pub column_label: String,
    pub canonical_key: String,
    pub group: FieldGroup,
    pub card_display_type: CardDisplayType,
    pub chart_display_type: ChartDisplayType,
    pub display_order: u32,
    pub match_kind: MatchKind,
}

/// 競合に負けて対応付けから外れた列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacedColumn {
    pub column_position: usize,
    pub column_label: String,
    pub canonical_key: String,
    /// 正規キーを保持した列
    pub winner_position: usize,
}

/// 照合レポートの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub column_position: usize,
    pub column_letter: String,
    pub original_label: String,
    pub canonical_key: String,
    pub group: FieldGroup,
    pub card_display_type: CardDisplayType,
    pub chart_display_type: ChartDisplayType,
    pub display_order: u32,
    pub match_kind: MatchKind,
}

impl From<&ReconciledMapping> for ReportEntry {
    fn from(mapping: &ReconciledMapping) -> Self {
        Self {
            column_position: mapping.column_position,
            column_letter: mapping.column_letter.clone(),
            original_label: mapping.column_label.clone(),
            canonical_key: mapping.canonical_key.clone(),
            group: mapping.group,
            card_display_type: mapping.card_display_type,
            chart_display_type: mapping.chart_display_type,
            display_order: mapping.display_order,
            match_kind: mapping.match_kind,
        }
    }
}

/// プロフィール画像の照合結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileImage {
    pub filename: Option<String>,
    /// 類似度（0-100）
    pub confidence: Option<u8>,
    pub has_image: bool,
}

impl ProfileImage {
    pub fn matched(filename: String, confidence: u8) -> Self {
        Self {
            filename: Some(filename),
            confidence: Some(confidence),
            has_image: true,
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}

/// 1回答者分のレコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(flatten)]
    fields: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_image: Option<ProfileImage>,
}

impl EmployeeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|v| v.as_str())
    }

    /// 空白以外の値を持つか
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn profile_image(&self) -> Option<&ProfileImage> {
        self.profile_image.as_ref()
    }

    pub fn set_profile_image(&mut self, image: ProfileImage) {
        self.profile_image = Some(image);
    }
}
