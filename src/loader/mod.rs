//! 入力ファイル読み込みモジュール
//!
//! 表計算ファイル（xlsx/xlsm/xls/ods）とCSVを、ヘッダー行＋データ行の文字列表に変換する。
//! 旧形式のテキスト回答フォルダは [`legacy`] で扱う。

mod csv;
pub mod legacy;
mod spreadsheet;

pub use legacy::{load_survey_directory, LegacyBatch};

use crate::error::{ReconcileError, Result};
use std::path::Path;

/// 読み込んだ表（1行目をヘッダーとして分離済み）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// 全行を受け取り、先頭をヘッダーとして分離
    pub fn from_rows(mut rows: Vec<Vec<String>>, source: &Path) -> Result<Self> {
        if rows.is_empty() {
            return Err(ReconcileError::EmptyTable(source.display().to_string()));
        }
        let labels = rows.remove(0);
        Ok(Self { labels, rows })
    }

    /// 競合解決に使う1行目のデータ
    pub fn sample_row(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }
}

/// 拡張子に応じて読み込み
pub fn load_table(path: &Path) -> Result<RawTable> {
    if !path.exists() {
        return Err(ReconcileError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => spreadsheet::read_first_sheet(path)?,
        "csv" => csv::read_csv(path)?,
        _ => return Err(ReconcileError::UnsupportedFormat(path.display().to_string())),
    };

    let table = RawTable::from_rows(rows, path)?;
    tracing::info!(
        path = %path.display(),
        columns = table.labels.len(),
        rows = table.rows.len(),
        "表を読み込み"
    );
    Ok(table)
}

/// 全セルが空の行か
fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}
