//! 表計算ファイル読み込み（calamine）
//!
//! 先頭シートのみを対象に、全セルを文字列へ変換する。

use super::is_blank_row;
use crate::error::{ReconcileError, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(super) fn read_first_sheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReconcileError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReconcileError::EmptyTable(path.display().to_string()))?
        .map_err(|e| ReconcileError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|row| !is_blank_row(row))
        .collect();

    Ok(rows)
}

/// セル値を文字列に変換
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format(DATETIME_FORMAT).to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => {
            tracing::debug!(error = ?e, "セルのエラー値を空として扱う");
            String::new()
        }
    }
}

/// 整数値のfloatは小数部なしで出力（評価 4.0 → "4"）
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
