use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("未対応のファイル形式です: {0}（xlsx/xlsm/xls/ods/csv に対応）")]
    UnsupportedFormat(String),

    #[error("表計算ファイルの読み込みに失敗: {0}")]
    Spreadsheet(String),

    #[error("ヘッダー行がありません: {0}")]
    EmptyTable(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] survey_reconcile_common::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
