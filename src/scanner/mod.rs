use crate::error::{ReconcileError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// 人物画像として扱う拡張子（大文字小文字は区別しない）
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// フォルダ直下の画像ファイルを列挙
pub fn scan_images(folder: &Path) -> Result<Vec<ScannedFile>> {
    scan_folder(folder, is_image_extension)
}

/// フォルダ直下の .txt ファイルを列挙
pub fn scan_text_files(folder: &Path) -> Result<Vec<ScannedFile>> {
    scan_folder(folder, |ext| ext.eq_ignore_ascii_case("txt"))
}

/// 拡張子が対応画像形式か
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

fn scan_folder(folder: &Path, accept: impl Fn(&str) -> bool) -> Result<Vec<ScannedFile>> {
    if !folder.is_dir() {
        return Err(ReconcileError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(ext) = path.extension() else {
            continue;
        };
        if !accept(&ext.to_string_lossy()) {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        files.push(ScannedFile {
            path: path.to_path_buf(),
            file_name,
        });
    }

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}
