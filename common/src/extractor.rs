//! レコード抽出
//!
//! 照合済みの対応付けをデータ行に適用し、正規キー → 値のレコードを作る。
//! 空セルは読み飛ばす。必須キーの有無の判定は呼び出し側で行う。

use crate::reconciler::HeaderMap;
use crate::types::EmployeeRecord;

/// 1行分のセル値からレコードを作る
///
/// 行の長さが足りない列は空セルとして扱う。失敗することはない。
pub fn extract(row: &[String], map: &HeaderMap) -> EmployeeRecord {
    let mut record = EmployeeRecord::new();

    for (position, mapping) in map.iter() {
        let Some(value) = row.get(position) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        record.insert(mapping.canonical_key.clone(), value);
    }

    record
}
