//! ヘッダー照合モジュール
//!
//! 表計算ファイルの生ヘッダーをカタログの正規フィールドへ対応付ける。
//!
//! ## 処理フロー
//! 1. 完全一致パス: ラベル一致の候補から、カタログ位置が実際の列位置に最も近いものを採用
//! 2. 曖昧一致パス: 未対応の列を類似度で照合し、閾値を超えた最良候補を採用
//!    （正規キーが既に使われていれば競合解決ポリシーに委ねる）
//! 3. どれにも当たらない列は既定の対応付け（末尾表示・非表示）
//!
//! 照合状態は呼び出しごとに作り直すため、別データセット間で判断が漏れることはない。

use crate::catalog::{normalize_label, CanonicalFieldCatalog, CanonicalFieldSpec};
use crate::conflict::{ConflictPolicy, NumericPreference};
use crate::types::{
    CardDisplayType, ChartDisplayType, DisplacedColumn, FieldGroup, MatchKind, ReconciledMapping,
    ReportEntry, PROFILE_IMAGE_KEY,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// 曖昧一致の採用閾値（この値を超えたら採用）
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

/// 未知ヘッダーのdisplay_order（実在の順序より必ず大きい）
pub const FALLBACK_DISPLAY_ORDER: u32 = 999;

/// 部分一致時の類似度
const CONTAINMENT_SCORE: f64 = 0.8;

/// 照合オプション
#[derive(Debug, Clone)]
pub struct ReconcilerOptions {
    pub fuzzy_threshold: f64,
    pub fallback_display_order: u32,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fallback_display_order: FALLBACK_DISPLAY_ORDER,
        }
    }
}

/// 1回の照合結果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeaderMap {
    mappings: BTreeMap<usize, ReconciledMapping>,
    displaced: Vec<DisplacedColumn>,
}

impl HeaderMap {
    pub fn get(&self, column_position: usize) -> Option<&ReconciledMapping> {
        self.mappings.get(&column_position)
    }

    /// 列位置順に走査
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ReconciledMapping)> {
        self.mappings.iter().map(|(&pos, m)| (pos, m))
    }

    pub fn mappings(&self) -> impl Iterator<Item = &ReconciledMapping> {
        self.mappings.values()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// 正規キーを保持している列位置
    pub fn position_of(&self, canonical_key: &str) -> Option<usize> {
        self.mappings
            .values()
            .find(|m| m.canonical_key == canonical_key)
            .map(|m| m.column_position)
    }

    /// 競合で外れた列
    pub fn displaced(&self) -> &[DisplacedColumn] {
        &self.displaced
    }

    /// 監査用レポート（列位置順）
    pub fn report(&self) -> Vec<ReportEntry> {
        self.mappings.values().map(ReportEntry::from).collect()
    }
}

/// ヘッダー照合器
///
/// カタログへの参照と設定のみを持ち、照合ごとの状態は持たない。
pub struct HeaderReconciler<'a, P: ConflictPolicy = NumericPreference> {
    catalog: &'a CanonicalFieldCatalog,
    options: ReconcilerOptions,
    policy: P,
}

impl<'a> HeaderReconciler<'a, NumericPreference> {
    pub fn new(catalog: &'a CanonicalFieldCatalog, options: ReconcilerOptions) -> Self {
        Self::with_policy(catalog, options, NumericPreference)
    }
}

impl<'a, P: ConflictPolicy> HeaderReconciler<'a, P> {
    pub fn with_policy(catalog: &'a CanonicalFieldCatalog, options: ReconcilerOptions, policy: P) -> Self {
        Self {
            catalog,
            options,
            policy,
        }
    }

    /// 生ヘッダー列を正規フィールドへ対応付ける
    ///
    /// # Arguments
    /// * `raw_labels` - 列順のヘッダー文字列（重複あり得る）
    /// * `sample_row` - 競合解決に使う1行目のデータ（無ければテキスト扱い）
    pub fn reconcile(&self, raw_labels: &[String], sample_row: Option<&[String]>) -> HeaderMap {
        let mut map = HeaderMap::default();
        // 正規キー → 保持している列位置
        let mut bound: HashMap<String, usize> = HashMap::new();
        // 既定の対応付けは常にカタログ内のどの順序よりも後ろ
        let fallback_order = self
            .options
            .fallback_display_order
            .max(self.catalog.max_display_order().saturating_add(1));

        // 1. 完全一致
        for (position, label) in raw_labels.iter().enumerate() {
            let nearest = self
                .catalog
                .lookup_by_label(label)
                .into_iter()
                .filter(|spec| !bound.contains_key(&spec.canonical_key))
                .min_by_key(|spec| (spec.catalog_position.abs_diff(position), spec.catalog_position));

            if let Some(spec) = nearest {
                tracing::debug!(
                    column = position,
                    label = %label,
                    canonical_key = %spec.canonical_key,
                    "完全一致"
                );
                bound.insert(spec.canonical_key.clone(), position);
                map.mappings
                    .insert(position, mapping_from_spec(position, label, spec, MatchKind::Exact));
            }
        }

        // 2. 曖昧一致と既定値
        for (position, label) in raw_labels.iter().enumerate() {
            if map.mappings.contains_key(&position) {
                continue;
            }

            let Some((spec, score)) = self.best_fuzzy_match(label) else {
                let mapping = self.fallback_mapping(position, label, &bound, fallback_order);
                tracing::warn!(
                    column = position,
                    label = %label,
                    canonical_key = %mapping.canonical_key,
                    "カタログに該当するヘッダーがありません（既定の対応付けを使用）"
                );
                bound.insert(mapping.canonical_key.clone(), position);
                map.mappings.insert(position, mapping);
                continue;
            };

            if let Some(&existing_position) = bound.get(&spec.canonical_key) {
                let replace = match map.mappings.get(&existing_position) {
                    Some(existing) => self.policy.should_replace(
                        existing,
                        sample_value(sample_row, position),
                        sample_value(sample_row, existing_position),
                    ),
                    None => true,
                };

                if !replace {
                    tracing::debug!(
                        column = position,
                        label = %label,
                        canonical_key = %spec.canonical_key,
                        kept = existing_position,
                        "競合: 既存の対応付けを維持"
                    );
                    map.displaced.push(DisplacedColumn {
                        column_position: position,
                        column_label: label.clone(),
                        canonical_key: spec.canonical_key.clone(),
                        winner_position: existing_position,
                    });
                    continue;
                }

                if let Some(removed) = map.mappings.remove(&existing_position) {
                    tracing::debug!(
                        column = position,
                        label = %label,
                        canonical_key = %spec.canonical_key,
                        replaced = existing_position,
                        "競合: 候補列で置き換え"
                    );
                    map.displaced.push(DisplacedColumn {
                        column_position: existing_position,
                        column_label: removed.column_label,
                        canonical_key: removed.canonical_key,
                        winner_position: position,
                    });
                }
            }

            tracing::debug!(
                column = position,
                label = %label,
                canonical_key = %spec.canonical_key,
                score,
                "曖昧一致"
            );
            bound.insert(spec.canonical_key.clone(), position);
            map.mappings
                .insert(position, mapping_from_spec(position, label, spec, MatchKind::Fuzzy));
        }

        map.displaced.sort_by_key(|d| d.column_position);
        map
    }

    /// 閾値を超えた最良候補（同点はカタログ宣言順で先のもの）
    fn best_fuzzy_match(&self, label: &str) -> Option<(&'a CanonicalFieldSpec, f64)> {
        let mut best: Option<(&'a CanonicalFieldSpec, f64)> = None;

        for spec in self.catalog.all_specs() {
            let score = similarity(label, &spec.expected_label);
            if score <= self.options.fuzzy_threshold {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((spec, score));
            }
        }

        best
    }

    fn fallback_mapping(
        &self,
        position: usize,
        label: &str,
        bound: &HashMap<String, usize>,
        display_order: u32,
    ) -> ReconciledMapping {
        let mut base = clean_label(label);
        if base.is_empty() {
            base = format!("unnamed_{}", column_letter(position).to_lowercase());
        }

        let mut key = base.clone();
        let mut suffix = 2;
        // profile_image は画像照合結果のキー
        while bound.contains_key(&key) || key == PROFILE_IMAGE_KEY {
            key = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        ReconciledMapping {
            column_position: position,
            column_letter: column_letter(position),
            column_label: label.to_string(),
            canonical_key: key,
            group: FieldGroup::AdditionalData,
            card_display_type: CardDisplayType::Hidden,
            chart_display_type: ChartDisplayType::Hidden,
            display_order,
            match_kind: MatchKind::Fallback,
        }
    }
}

fn mapping_from_spec(
    position: usize,
    label: &str,
    spec: &CanonicalFieldSpec,
    match_kind: MatchKind,
) -> ReconciledMapping {
    ReconciledMapping {
        column_position: position,
        column_letter: column_letter(position),
        column_label: label.to_string(),
        canonical_key: spec.canonical_key.clone(),
        group: spec.group,
        card_display_type: spec.card_display_type,
        chart_display_type: spec.chart_display_type,
        display_order: spec.display_order,
        match_kind,
    }
}

fn sample_value(sample_row: Option<&[String]>, position: usize) -> Option<&str> {
    sample_row
        .and_then(|row| row.get(position))
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
}

/// ヘッダー同士の類似度（0.0-1.0）
///
/// - 大文字小文字を無視した完全一致: 1.0
/// - 一方が他方を含む: 0.8
/// - それ以外: 単語集合のJaccard係数
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize_label(a).to_lowercase();
    let b = normalize_label(b).to_lowercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return CONTAINMENT_SCORE;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();

    intersection as f64 / union as f64
}

/// ヘッダーをフィールド名として使える形に変換
///
/// 小文字化し、英数字と空白以外を除去、空白を`_`に置換する。
pub fn clean_label(label: &str) -> String {
    normalize_label(label)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// 列番号（0始まり）をExcel列記号に変換
pub fn column_letter(position: usize) -> String {
    let mut letters = Vec::new();
    let mut n = position + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
