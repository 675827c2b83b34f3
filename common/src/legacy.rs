//! 旧形式テキスト回答の解析
//!
//! `Label: value` 形式の行からレコードを作る。
//! ラベル末尾の修飾（コメント欄・評価尺度）で正規キーの接尾辞を決める。
//!
//! | ラベル | 正規キー |
//! |--------|----------|
//! | `Communication – comments` | `communication_comments` |
//! | `Communication (rating 1–5)` | `communication_rating` |
//! | `Teamwork (stars 1–5)` | `teamwork_stars` |
//! | `Software & Tools` | `software_and_tools` |

use crate::types::{EmployeeRecord, PROFILE_IMAGE_KEY};
use regex::Regex;

/// 固定ラベル → 正規キー
const FIXED_LABELS: &[(&str, &str)] = &[
    ("Submitted", "submitted"),
    ("Responder", "responder"),
    ("Employee Name", "employee_name"),
    ("Date of Evaluation", "date_of_evaluation"),
    ("Employee Role", "employee_role"),
    ("Overall Performance (stars 1–5)", "overall_performance"),
];

/// 欠損値として扱う値
const MISSING_VALUE: &str = "N/A";

lazy_static::lazy_static! {
    static ref OVERALL_COMMENTS_RE: Regex = Regex::new(r"(?i)^(.+?)\s+[–-]\s+overall comments$").unwrap();
    static ref COMMENTS_RE: Regex = Regex::new(r"(?i)^(.+?)\s+[–-]\s+comments$").unwrap();
    static ref SCALE_RE: Regex = Regex::new(r"(?i)^(.+?)\s*\((rating|stars)?\s*\d+\s*[–-]\s*\d+\)$").unwrap();
    static ref QUALIFIER_RE: Regex = Regex::new(r"^(.+?)\s*\(.*\)$").unwrap();
    static ref SURVEY_FILENAME_RE: Regex =
        Regex::new(r"^_\d{4}-\d{2}-\d{2}T\d{2}_\d{2}_\d{2}\.\d+Z\.txt$").unwrap();
}

/// 回答ファイル名の形式チェック（`_2024-03-01T09_15_30.123Z.txt`）
pub fn is_valid_survey_filename(file_name: &str) -> bool {
    SURVEY_FILENAME_RE.is_match(file_name)
}

/// 回答テキスト全体を解析（同じキーは後の行で上書き）
pub fn parse_legacy_text(content: &str) -> EmployeeRecord {
    let mut record = EmployeeRecord::new();
    for line in content.lines() {
        if let Some((key, value)) = parse_legacy_line(line) {
            record.insert(key, value);
        }
    }
    record
}

/// 1行を解析して (正規キー, 値) を返す
///
/// `:` を含まない行、値が空または `N/A` の行は `None`
pub fn parse_legacy_line(line: &str) -> Option<(String, String)> {
    let (label, value) = line.trim().split_once(':')?;
    let label = label.trim();
    let value = value.trim();

    if label.is_empty() || value.is_empty() || value.eq_ignore_ascii_case(MISSING_VALUE) {
        return None;
    }

    let mut key = legacy_key(label);
    if key == PROFILE_IMAGE_KEY {
        key.push_str("_2");
    }
    Some((key, value.to_string()))
}

fn legacy_key(label: &str) -> String {
    if let Some((_, key)) = FIXED_LABELS.iter().find(|(fixed, _)| *fixed == label) {
        return key.to_string();
    }

    if let Some(caps) = OVERALL_COMMENTS_RE.captures(label) {
        return format!("{}_overall_comments", field_key(&caps[1]));
    }

    if let Some(caps) = COMMENTS_RE.captures(label) {
        return format!("{}_comments", field_key(&caps[1]));
    }

    if let Some(caps) = SCALE_RE.captures(label) {
        let suffix = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
            Some(kind) if kind == "stars" => "stars",
            _ => "rating",
        };
        return format!("{}_{}", field_key(&caps[1]), suffix);
    }

    if let Some(caps) = QUALIFIER_RE.captures(label) {
        return field_key(&caps[1]);
    }

    field_key(label)
}

/// ラベルをキー形式に変換（小文字化、空白・ダッシュ→`_`、`&`→`and`）
fn field_key(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace(' ', "_")
        .replace('–', "_")
        .replace('&', "and")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_labels() {
        assert_eq!(
            parse_legacy_line("Employee Name: Jane Doe"),
            Some(("employee_name".to_string(), "Jane Doe".to_string()))
        );
        assert_eq!(
            parse_legacy_line("Overall Performance (stars 1–5): 4"),
            Some(("overall_performance".to_string(), "4".to_string()))
        );
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        assert_eq!(
            parse_legacy_line("Submitted: 2024-03-01 09:15:30"),
            Some(("submitted".to_string(), "2024-03-01 09:15:30".to_string()))
        );
    }

    #[test]
    fn test_comments_suffix() {
        assert_eq!(
            parse_legacy_line("Communication – comments: Clear and timely"),
            Some(("communication_comments".to_string(), "Clear and timely".to_string()))
        );
        assert_eq!(
            parse_legacy_line("Teamwork - comments: Helpful"),
            Some(("teamwork_comments".to_string(), "Helpful".to_string()))
        );
        assert_eq!(
            parse_legacy_line("Leadership – overall comments: Strong"),
            Some(("leadership_overall_comments".to_string(), "Strong".to_string()))
        );
    }

    #[test]
    fn test_rating_suffix() {
        assert_eq!(
            parse_legacy_line("Communication (rating 1–5): 4"),
            Some(("communication_rating".to_string(), "4".to_string()))
        );
        assert_eq!(
            parse_legacy_line("Collaboration (1-5): 3"),
            Some(("collaboration_rating".to_string(), "3".to_string()))
        );
        assert_eq!(
            parse_legacy_line("Teamwork (stars 1–5): 5"),
            Some(("teamwork_stars".to_string(), "5".to_string()))
        );
    }

    #[test]
    fn test_other_qualifier_dropped() {
        assert_eq!(
            parse_legacy_line("Revit (proficiency): Advanced"),
            Some(("revit".to_string(), "Advanced".to_string()))
        );
    }

    #[test]
    fn test_bare_label_transform() {
        assert_eq!(
            parse_legacy_line("Software & Tools: Rhino"),
            Some(("software_and_tools".to_string(), "Rhino".to_string()))
        );
        assert_eq!(
            parse_legacy_line("Technical Knowledge & Expertise: Solid"),
            Some(("technical_knowledge_and_expertise".to_string(), "Solid".to_string()))
        );
    }

    #[test]
    fn test_profile_image_key_is_reserved() {
        assert_eq!(
            parse_legacy_line("Profile Image: jane.jpg"),
            Some(("profile_image_2".to_string(), "jane.jpg".to_string()))
        );
    }

    #[test]
    fn test_missing_values_dropped() {
        assert_eq!(parse_legacy_line("Email: N/A"), None);
        assert_eq!(parse_legacy_line("Email:   "), None);
        assert_eq!(parse_legacy_line("no colon here"), None);
    }

    #[test]
    fn test_parse_legacy_text() {
        let content = "Submitted: 2024-03-01\nEmployee Name: Jane Doe\n\nCommunication (rating 1–5): 4\nCommunication – comments: Good\nEmail: N/A\n";
        let record = parse_legacy_text(content);
        assert_eq!(record.get("employee_name"), Some("Jane Doe"));
        assert_eq!(record.get("communication_rating"), Some("4"));
        assert_eq!(record.get("communication_comments"), Some("Good"));
        assert!(record.get("email").is_none());
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_is_valid_survey_filename() {
        assert!(is_valid_survey_filename("_2024-03-01T09_15_30.123Z.txt"));
        assert!(!is_valid_survey_filename("notes.txt"));
        assert!(!is_valid_survey_filename("_2024-03-01T09_15_30Z.txt"));
    }
}
