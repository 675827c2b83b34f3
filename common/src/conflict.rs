//! 正規キー競合の解決
//!
//! 2つの列が同じ正規キーに曖昧一致したとき、どちらを残すかを決める。
//! 1行目の値を見て、数値（評価）の列をテキスト（コメント）の列より優先する。
//! それ以外は先に対応付いた列を残す。あくまで経験則であり、
//! 両方が数値の別質問だった場合は誤った列が残りうる。

use crate::types::ReconciledMapping;

/// 競合解決ポリシー
pub trait ConflictPolicy {
    /// 既存の対応付けを候補列で置き換えるべきか
    ///
    /// # Arguments
    /// * `existing` - 既に正規キーを保持している対応付け
    /// * `candidate_sample` - 候補列の1行目の値
    /// * `existing_sample` - 既存列の1行目の値
    fn should_replace(
        &self,
        existing: &ReconciledMapping,
        candidate_sample: Option<&str>,
        existing_sample: Option<&str>,
    ) -> bool;
}

/// 数値優先ポリシー（デフォルト）
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericPreference;

impl ConflictPolicy for NumericPreference {
    fn should_replace(
        &self,
        existing: &ReconciledMapping,
        candidate_sample: Option<&str>,
        existing_sample: Option<&str>,
    ) -> bool {
        let candidate_numeric = candidate_sample.is_some_and(is_numeric_value);
        let existing_numeric = existing_sample.is_some_and(is_numeric_value);
        let replace = candidate_numeric && !existing_numeric;

        tracing::debug!(
            canonical_key = %existing.canonical_key,
            existing_column = existing.column_position,
            candidate_numeric,
            existing_numeric,
            replace,
            "正規キー競合を解決"
        );

        replace
    }
}

/// 前後空白を除いて整数として解釈できるか
pub fn is_numeric_value(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok()
}
