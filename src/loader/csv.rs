//! CSV読み込み（ダブルクォート対応）
//!
//! クォート内のカンマと `""` エスケープを扱う。クォート内の改行には対応しない。

use super::is_blank_row;
use crate::error::Result;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

pub(super) fn read_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_csv(&content))
}

/// CSV文字列を行ごとのセル列に変換（空行は除外）
pub(super) fn parse_csv(content: &str) -> Vec<Vec<String>> {
    content
        .trim_start_matches(UTF8_BOM)
        .lines()
        .map(parse_csv_line)
        .filter(|row| !is_blank_row(row))
        .collect()
}

/// CSV行をパース
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // "" はクォート文字そのもの
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }

    // 最後のフィールド
    fields.push(field);
    fields
}
