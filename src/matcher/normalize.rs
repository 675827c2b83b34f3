//! 名前の正規化
//!
//! 回答者名と画像ファイル名を同じ形（小文字・敬称なし・記号なし）にそろえる。

use regex::Regex;
use std::path::Path;

lazy_static::lazy_static! {
    static ref HONORIFIC_RE: Regex = Regex::new(r"^(mr|ms|mrs|dr)\.?\s+").unwrap();
    static ref GENERATION_RE: Regex = Regex::new(r"[,\s]+(jr|sr|iii|ii|iv)\.?$").unwrap();
    static ref PUNCTUATION_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref FILE_SUFFIX_RE: Regex = Regex::new(r"(?i)[_\- ](profile|pic|photo|img)$").unwrap();
    static ref SEPARATOR_RE: Regex = Regex::new(r"[_\-]").unwrap();
    static ref CAMEL_RE: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
}

/// 名前を比較用に正規化
///
/// 例: `"Dr. Jane  O'Neil, Jr."` → `"jane oneil"`
pub fn normalize_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let without_title = HONORIFIC_RE.replace(&collapsed, "");
    let without_generation = GENERATION_RE.replace(&without_title, "");
    let without_punctuation = PUNCTUATION_RE.replace_all(&without_generation, "");

    without_punctuation.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 画像ファイル名から正規化済みの名前を導く
///
/// 例: `"JaneDoe_profile.jpg"` → `"jane doe"`
pub fn name_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let without_suffix = FILE_SUFFIX_RE.replace(&stem, "");
    let spaced = SEPARATOR_RE.replace_all(&without_suffix, " ");
    let split_camel = CAMEL_RE.replace_all(&spaced, "$1 $2");

    normalize_name(&split_camel)
}
