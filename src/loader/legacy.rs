//! 旧形式テキスト回答フォルダの読み込み
//!
//! `_YYYY-MM-DDTHH_MM_SS.fffZ.txt` 形式のファイルを1回答者分として読み込む。
//! 文字コードは UTF-8（BOM可）を優先し、失敗したら Latin-1 として読む。

use crate::error::Result;
use crate::scanner;
use chrono::NaiveDateTime;
use std::path::Path;
use survey_reconcile_common::{is_valid_survey_filename, parse_legacy_text, EmployeeRecord};

/// 回答者名の正規キー
const NAME_KEY: &str = "employee_name";

/// 提出日時の正規キー
const SUBMITTED_KEY: &str = "submitted";

const FILENAME_TIMESTAMP_FORMAT: &str = "_%Y-%m-%dT%H_%M_%S%.fZ.txt";

/// 読み込み結果
#[derive(Debug, Clone, Default)]
pub struct LegacyBatch {
    /// ファイル名順のレコード
    pub records: Vec<EmployeeRecord>,
    /// 全レコードに現れたキー（初出順）
    pub fields: Vec<String>,
    /// 命名規則に合わないため読まなかったファイル
    pub ignored_files: Vec<String>,
    /// 回答者名が無いため捨てたファイル
    pub rejected_files: Vec<String>,
}

/// フォルダ直下の回答ファイルをすべて読み込む
pub fn load_survey_directory(dir: &Path) -> Result<LegacyBatch> {
    let mut batch = LegacyBatch::default();

    for file in scanner::scan_text_files(dir)? {
        if !is_valid_survey_filename(&file.file_name) {
            tracing::debug!(file = %file.file_name, "命名規則外のファイルを無視");
            batch.ignored_files.push(file.file_name);
            continue;
        }

        let bytes = std::fs::read(&file.path)?;
        let mut record = parse_legacy_text(&decode_text(&bytes));

        if !record.has(NAME_KEY) {
            tracing::warn!(file = %file.file_name, "回答者名が無いレコードを除外");
            batch.rejected_files.push(file.file_name);
            continue;
        }

        if !record.has(SUBMITTED_KEY) {
            if let Some(timestamp) = submitted_from_filename(&file.file_name) {
                record.insert(SUBMITTED_KEY, timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
            }
        }

        for key in record.keys() {
            if !batch.fields.iter().any(|f| f == key) {
                batch.fields.push(key.to_string());
            }
        }
        batch.records.push(record);
    }

    tracing::info!(
        dir = %dir.display(),
        records = batch.records.len(),
        ignored = batch.ignored_files.len(),
        rejected = batch.rejected_files.len(),
        "旧形式回答を読み込み"
    );
    Ok(batch)
}

/// ファイル名から提出日時を取り出す
pub fn submitted_from_filename(file_name: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(file_name, FILENAME_TIMESTAMP_FORMAT).ok()
}

/// UTF-8（BOM除去）で読めなければ Latin-1 として解釈
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
