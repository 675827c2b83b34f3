//! 人物画像照合モジュール
//!
//! 回答者名を画像フォルダのファイル名と照合する。
//! 類似度は正規化済みの名前同士の編集距離（0-100）で、上位N件のうち最良が閾値以上なら採用。

mod normalize;
mod types;

pub use normalize::{name_from_filename, normalize_name};
pub use types::{IdentityCandidate, MatchResult};

use crate::error::Result;
use crate::scanner;
use std::path::Path;

/// 既定の採用閾値
pub const DEFAULT_NAME_THRESHOLD: u8 = 70;

/// 既定の上位候補数
pub const DEFAULT_TOP_N: usize = 3;

/// 画像フォルダから照合候補を作る（直下のみ、ファイル名順）
pub fn candidates_from_directory(dir: &Path) -> Result<Vec<IdentityCandidate>> {
    let candidates: Vec<IdentityCandidate> = scanner::scan_images(dir)?
        .into_iter()
        .map(|file| IdentityCandidate {
            normalized_name: name_from_filename(&file.file_name),
            filename: file.file_name,
        })
        .collect();

    tracing::debug!(dir = %dir.display(), count = candidates.len(), "照合候補を読み込み");
    Ok(candidates)
}

/// 正規化済みの名前同士の類似度（0-100）
///
/// 100 は完全一致のみ。それ以外は切り捨てで最大 99
pub fn name_similarity(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }
    (strsim::normalized_levenshtein(a, b) * 100.0).floor().clamp(0.0, 99.0) as u8
}

/// 名前照合器
#[derive(Debug, Clone)]
pub struct IdentityMatcher {
    threshold: u8,
    top_n: usize,
}

impl Default for IdentityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_THRESHOLD)
    }
}

impl IdentityMatcher {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// 類似度の高い順に上位N件（同点は候補の並び順）
    pub fn ranked<'c>(&self, name: &str, candidates: &'c [IdentityCandidate]) -> Vec<(&'c IdentityCandidate, u8)> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&IdentityCandidate, u8)> = candidates
            .iter()
            .map(|c| (c, name_similarity(&normalized, &c.normalized_name)))
            .collect();
        // sort_byは安定ソート
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(self.top_n);
        scored
    }

    /// 最良の候補を返す（閾値未満なら未照合）
    pub fn best_match(&self, name: &str, candidates: &[IdentityCandidate]) -> MatchResult {
        match self.ranked(name, candidates).first() {
            Some((candidate, score)) if *score >= self.threshold => {
                tracing::debug!(name, candidate = %candidate.filename, score, "画像を照合");
                MatchResult::matched(candidate.filename.clone(), *score)
            }
            best => {
                tracing::warn!(
                    name,
                    best_score = best.map(|(_, s)| *s),
                    threshold = self.threshold,
                    "閾値を超える画像がありません"
                );
                MatchResult::unmatched()
            }
        }
    }
}
