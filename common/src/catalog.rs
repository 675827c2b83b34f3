//! 正規フィールドカタログ
//!
//! アンケート出力の既知ヘッダーと正規キーの対応表。
//! 構築後は読み取り専用で、照合処理から共有される。

use crate::error::{Error, Result};
use crate::types::{CardDisplayType, ChartDisplayType, FieldGroup, PROFILE_IMAGE_KEY};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// カタログの1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFieldSpec {
    pub canonical_key: String,
    /// ソース形式で期待されるヘッダー文字列
    pub expected_label: String,
    pub group: FieldGroup,
    pub card_display_type: CardDisplayType,
    pub chart_display_type: ChartDisplayType,
    pub display_order: u32,
    /// ソース形式でのヘッダー位置（0始まり）
    pub catalog_position: usize,
}

/// 正規フィールドカタログ
#[derive(Debug, Clone)]
pub struct CanonicalFieldCatalog {
    specs: Vec<CanonicalFieldSpec>,
    /// 正規化ラベル → specsのインデックス
    by_label: HashMap<String, Vec<usize>>,
}

lazy_static::lazy_static! {
    static ref SHARED_CATALOG: CanonicalFieldCatalog = CanonicalFieldCatalog::default_catalog();
}

impl CanonicalFieldCatalog {
    /// エントリ一覧から構築（正規キーの重複・予約キーはエラー）
    pub fn new(specs: Vec<CanonicalFieldSpec>) -> Result<Self> {
        let mut keys = HashSet::new();
        for spec in &specs {
            if spec.canonical_key.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "empty canonical key for label '{}'",
                    spec.expected_label
                )));
            }
            if spec.canonical_key == PROFILE_IMAGE_KEY {
                return Err(Error::InvalidCatalog(format!(
                    "canonical key '{}' is reserved",
                    PROFILE_IMAGE_KEY
                )));
            }
            if !keys.insert(spec.canonical_key.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate canonical key '{}'",
                    spec.canonical_key
                )));
            }
        }
        Ok(Self::build(specs))
    }

    fn build(specs: Vec<CanonicalFieldSpec>) -> Self {
        let mut by_label: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, spec) in specs.iter().enumerate() {
            by_label
                .entry(normalize_label(&spec.expected_label))
                .or_default()
                .push(index);
        }
        Self { specs, by_label }
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<CanonicalFieldSpec> = serde_json::from_str(json)?;
        Self::new(specs)
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// プロセス共有の組み込みカタログ
    pub fn shared() -> &'static CanonicalFieldCatalog {
        &*SHARED_CATALOG
    }

    /// ラベル完全一致の候補（同一ラベルが複数キーを持つ場合は複数返る）
    pub fn lookup_by_label(&self, label: &str) -> Vec<&CanonicalFieldSpec> {
        self.by_label
            .get(&normalize_label(label))
            .map(|indices| indices.iter().map(|&i| &self.specs[i]).collect())
            .unwrap_or_default()
    }

    /// 全エントリ（宣言順）
    pub fn all_specs(&self) -> &[CanonicalFieldSpec] {
        &self.specs
    }

    pub fn get(&self, canonical_key: &str) -> Option<&CanonicalFieldSpec> {
        self.specs.iter().find(|s| s.canonical_key == canonical_key)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// 最大のdisplay_order
    pub fn max_display_order(&self) -> u32 {
        self.specs.iter().map(|s| s.display_order).max().unwrap_or(0)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.specs)?)
    }

    /// 社員自己評価フォーム（MS Forms出力）の組み込み定義
    pub fn default_catalog() -> Self {
        use CardDisplayType as Card;
        use ChartDisplayType as Chart;
        use FieldGroup::*;

        let rows: &[(usize, &str, &str, FieldGroup, Card, Chart, u32)] = &[
            // 基本情報
            (0, "ID", "id", BasicInfo, Card::Hidden, Chart::Hidden, 1),
            (1, "Start time", "start_time", BasicInfo, Card::Hidden, Chart::Hidden, 6),
            (2, "Completion time", "completion_time", BasicInfo, Card::Hidden, Chart::Hidden, 7),
            (3, "Email", "email", BasicInfo, Card::SingleLineText, Chart::Hidden, 5),
            (4, "Name", "employee_name", BasicInfo, Card::Hidden, Chart::Hidden, 2),
            (5, "Last modified time", "last_modified", BasicInfo, Card::Hidden, Chart::Hidden, 10),
            (6, "Employee Name", "employee_name_alt", BasicInfo, Card::Hidden, Chart::Hidden, 11),
            (7, "Title", "title", BasicInfo, Card::SingleLineText, Chart::Hidden, 3),
            (8, "Role", "employee_role", BasicInfo, Card::SingleLineText, Chart::Hidden, 4),
            (9, "Date", "date_of_evaluation", BasicInfo, Card::SingleLineText, Chart::TimeProgression, 8),
            // 評価（数値）
            (9, "Communication", "communication_rating", PerformanceRatings, Card::NumericRating, Chart::CategoricalDistribution, 1),
            (10, "Collaboration", "collaboration_rating", PerformanceRatings, Card::NumericRating, Chart::CategoricalDistribution, 2),
            (11, "Professionalism", "professionalism_rating", PerformanceRatings, Card::NumericRating, Chart::CategoricalDistribution, 3),
            (12, "Technical Knowledge & Expertise", "technical_knowledge_expertise_rating", PerformanceRatings, Card::NumericRating, Chart::CategoricalDistribution, 4),
            (13, "Workflow Implementation, Management, Execution", "workflow_implementation_management_execution_rating", PerformanceRatings, Card::NumericRating, Chart::CategoricalDistribution, 5),
            // 評価コメント（同名質問の2列目は末尾に"2"が付く）
            (14, "Communication2", "communication_comments", PerformanceComments, Card::MultilineText, Chart::Hidden, 1),
            (15, "Collaboration2", "collaboration_comments", PerformanceComments, Card::MultilineText, Chart::Hidden, 2),
            (16, "Professionalism2", "professionalism_comments", PerformanceComments, Card::MultilineText, Chart::Hidden, 3),
            (17, "Technical Knowledge & Expertise2", "technical_knowledge_expertise_comments", PerformanceComments, Card::MultilineText, Chart::Hidden, 4),
            (18, "Workflow Implementation, Management, Execution2", "workflow_implementation_management_execution_comments", PerformanceComments, Card::MultilineText, Chart::Hidden, 5),
            // ソフトウェア習熟度
            (19, "Revit", "revit", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 1),
            (20, "Rhino", "rhino", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 2),
            (21, "Enscape", "enscape", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 3),
            (22, "D5", "d5", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 4),
            (23, "Vantage Point", "vantage_point", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 5),
            (24, "Deltek/ADP", "deltek_adp", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 6),
            (25, "Newforma", "newforma", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 7),
            (26, "Bluebeam", "bluebeam", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 8),
            (27, "Grasshopper", "grasshopper", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 9),
            (28, "Word", "word", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 10),
            (29, "Powerpoint", "powerpoint", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 11),
            (30, "Excel", "excel", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 12),
            (31, "Illustrator", "illustrator", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 13),
            (32, "Photoshop", "photoshop", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 14),
            (33, "Indesign", "indesign", SoftwareTools, Card::NumericRating, Chart::CategoricalDistribution, 15),
            // 育成
            (34, "Employee Strengths", "employee_strengths", EmployeeDevelopment, Card::MultilineText, Chart::Hidden, 1),
            (35, "Areas for Growth / Development Goals", "areas_for_growth", EmployeeDevelopment, Card::MultilineText, Chart::Hidden, 2),
            // 総合評価
            (36, "Rate Your Overall Performance This Year", "overall_performance", OverallAssessment, Card::NumericRating, Chart::CategoricalDistribution, 1),
            (37, "Are there specific examples of your performance you'd like to share that weren't captured in earlier questions?", "performance_examples", OverallAssessment, Card::MultilineText, Chart::Hidden, 2),
            (38, "What additional resources would help you do your job more effectively?", "additional_resources", OverallAssessment, Card::MultilineText, Chart::Hidden, 3),
            // その他
            (39, "Please share your thoughts about the character and culture of our studio and practice.", "studio_culture_feedback", AdditionalData, Card::MultilineText, Chart::Hidden, 1),
            (40, "Software & Tools2", "software_tools_feedback", AdditionalData, Card::MultilineText, Chart::Hidden, 2),
        ];

        let specs = rows
            .iter()
            .map(|&(position, label, key, group, card, chart, order)| CanonicalFieldSpec {
                canonical_key: key.to_string(),
                expected_label: label.to_string(),
                group,
                card_display_type: card,
                chart_display_type: chart,
                display_order: order,
                catalog_position: position,
            })
            .collect();

        Self::build(specs)
    }
}

impl Default for CanonicalFieldCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}

/// 比較用にラベルを正規化（制御文字・連続空白を単一スペースへ、前後空白除去）
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(position: usize, label: &str, key: &str) -> CanonicalFieldSpec {
        CanonicalFieldSpec {
            canonical_key: key.to_string(),
            expected_label: label.to_string(),
            group: FieldGroup::AdditionalData,
            card_display_type: CardDisplayType::Hidden,
            chart_display_type: ChartDisplayType::Hidden,
            display_order: 1,
            catalog_position: position,
        }
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = CanonicalFieldCatalog::default_catalog();
        assert_eq!(catalog.len(), 42);
        // 組み込み定義も検証を通ること
        assert!(CanonicalFieldCatalog::new(catalog.all_specs().to_vec()).is_ok());
    }

    #[test]
    fn test_lookup_exact_label() {
        let catalog = CanonicalFieldCatalog::shared();
        let found = catalog.lookup_by_label("Communication2");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].canonical_key, "communication_comments");
    }

    #[test]
    fn test_lookup_collapses_whitespace_and_newlines() {
        let catalog = CanonicalFieldCatalog::shared();
        let found = catalog.lookup_by_label("  Technical Knowledge\n&  Expertise ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].canonical_key, "technical_knowledge_expertise_rating");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = CanonicalFieldCatalog::shared();
        assert!(catalog.lookup_by_label("communication").is_empty());
    }

    #[test]
    fn test_lookup_returns_all_specs_sharing_label() {
        let catalog = CanonicalFieldCatalog::new(vec![
            spec(40, "Software & Tools2", "software_tools_feedback"),
            spec(19, "Software & Tools2", "software_tools_rating"),
        ])
        .unwrap();
        let found = catalog.lookup_by_label("Software & Tools2");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = CanonicalFieldCatalog::new(vec![spec(0, "ID", "id"), spec(1, "Identifier", "id")]);
        assert!(matches!(result, Err(Error::InvalidCatalog(_))));
    }

    #[test]
    fn test_profile_image_key_rejected() {
        let result = CanonicalFieldCatalog::new(vec![spec(0, "Profile Image", "profile_image")]);
        assert!(matches!(result, Err(Error::InvalidCatalog(_))));
    }

    #[test]
    fn test_from_json_roundtrip_shape() {
        let json = r#"[{
            "canonical_key": "id",
            "expected_label": "ID",
            "group": "basic_info",
            "card_display_type": "hidden",
            "chart_display_type": "hidden",
            "display_order": 1,
            "catalog_position": 0
        }]"#;
        let catalog = CanonicalFieldCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("id").unwrap().group, FieldGroup::BasicInfo);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Start\ttime"), "Start time");
        assert_eq!(normalize_label("\u{0}Email\r\n"), "Email");
    }
}
