//! 照合パイプライン
//!
//! 表 → ヘッダー照合 → レコード抽出 → 必須キー検査 → 画像照合 の順に処理する。
//! ヘッダー照合は1回だけ逐次実行し、行ごとの抽出は並列に行う。

use crate::matcher::{IdentityCandidate, IdentityMatcher};
use crate::loader::RawTable;
use rayon::prelude::*;
use serde::Serialize;
use survey_reconcile_common::{
    extract, CanonicalFieldCatalog, DisplacedColumn, EmployeeRecord, HeaderReconciler, ReconcilerOptions,
    ReportEntry,
};

/// パイプライン設定
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub reconciler: ReconcilerOptions,
    /// この正規キーに値が無い行は除外
    pub required_key: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerOptions::default(),
            required_key: "employee_name".into(),
        }
    }
}

/// 除外した行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// ファイル上の行番号（ヘッダーが1行目）
    pub row_number: usize,
    pub reason: String,
}

/// パイプラインの出力
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub records: Vec<EmployeeRecord>,
    pub report: Vec<ReportEntry>,
    pub displaced: Vec<DisplacedColumn>,
    pub skipped: Vec<SkippedRow>,
}

/// 画像照合の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImageBindingStats {
    pub total: usize,
    pub matched: usize,
}

/// 表を照合してレコード化
pub fn process_table(table: &RawTable, catalog: &CanonicalFieldCatalog, options: &PipelineOptions) -> PipelineOutput {
    let reconciler = HeaderReconciler::new(catalog, options.reconciler.clone());
    let map = reconciler.reconcile(&table.labels, table.sample_row());

    let extracted: Vec<EmployeeRecord> = table.rows.par_iter().map(|row| extract(row, &map)).collect();

    let mut records = Vec::with_capacity(extracted.len());
    let mut skipped = Vec::new();
    for (index, record) in extracted.into_iter().enumerate() {
        if record.has(&options.required_key) {
            records.push(record);
        } else {
            let row_number = index + 2;
            tracing::warn!(row = row_number, key = %options.required_key, "必須項目が無い行を除外");
            skipped.push(SkippedRow {
                row_number,
                reason: format!("{} がありません", options.required_key),
            });
        }
    }

    tracing::info!(
        columns = map.len(),
        displaced = map.displaced().len(),
        records = records.len(),
        skipped = skipped.len(),
        "照合完了"
    );

    PipelineOutput {
        records,
        report: map.report(),
        displaced: map.displaced().to_vec(),
        skipped,
    }
}

/// 各レコードに人物画像を割り当てる（見つからなければ has_image=false）
pub fn bind_images(
    records: &mut [EmployeeRecord],
    candidates: &[IdentityCandidate],
    matcher: &IdentityMatcher,
    name_key: &str,
) -> ImageBindingStats {
    let mut stats = ImageBindingStats {
        total: records.len(),
        matched: 0,
    };

    for record in records.iter_mut() {
        let name = record.get(name_key).unwrap_or_default().to_string();
        let result = matcher.best_match(&name, candidates);
        if result.is_match() {
            stats.matched += 1;
        }
        record.set_profile_image(result.to_profile_image());
    }

    tracing::info!(total = stats.total, matched = stats.matched, "画像照合完了");
    stats
}
