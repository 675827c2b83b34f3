use serde::{Deserialize, Serialize};
use survey_reconcile_common::ProfileImage;

/// 照合候補（画像フォルダの1ファイル）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCandidate {
    pub filename: String,
    /// ファイル名から導いた正規化済みの名前
    pub normalized_name: String,
}

/// 照合結果
///
/// ファイル名と信頼度は両方あるか両方ないかのどちらか。
/// 外部入力から組み立てられないよう `Serialize` のみ実装する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    candidate_filename: Option<String>,
    confidence_score: Option<u8>,
}

impl MatchResult {
    pub fn matched(filename: impl Into<String>, confidence: u8) -> Self {
        Self {
            candidate_filename: Some(filename.into()),
            confidence_score: Some(confidence.min(100)),
        }
    }

    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.candidate_filename.is_some()
    }

    pub fn candidate_filename(&self) -> Option<&str> {
        self.candidate_filename.as_deref()
    }

    pub fn confidence_score(&self) -> Option<u8> {
        self.confidence_score
    }

    /// レコードに載せる画像情報へ変換
    pub fn to_profile_image(&self) -> ProfileImage {
        match (&self.candidate_filename, self.confidence_score) {
            (Some(filename), Some(confidence)) => ProfileImage::matched(filename.clone(), confidence),
            _ => ProfileImage::missing(),
        }
    }
}
